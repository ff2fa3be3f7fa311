pub(crate) mod boundary;
pub(crate) mod config;
pub(crate) mod pose;
