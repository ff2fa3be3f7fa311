pub(crate) mod assemble;
pub(crate) mod gaps;
pub(crate) mod model;
pub(crate) mod transitions;
