pub(crate) mod fingerprint;
pub(crate) mod plan;
pub(crate) mod segment;
pub(crate) mod step;
pub(crate) mod template;
