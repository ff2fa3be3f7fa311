//! xLights-facing output: value-curve strings and per-channel effect placements.

pub(crate) mod value_curve;
