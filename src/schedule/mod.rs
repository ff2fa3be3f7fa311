pub(crate) mod repeat;
