//! CurveEngine: pure math over normalized `(t, v)` point sequences.

pub(crate) mod factory;
pub(crate) mod model;
pub(crate) mod ops;
pub(crate) mod simplify;
