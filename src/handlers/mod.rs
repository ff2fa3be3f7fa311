pub(crate) mod dimmer;
pub(crate) mod geometry;
pub(crate) mod movement;
pub(crate) mod registry;
