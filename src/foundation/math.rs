/// Decimal places kept on normalized curve time.
pub(crate) const TIME_DECIMALS: i32 = 6;

pub(crate) fn round_decimals(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    let r = (v * scale).round() / scale;
    // Normalize -0.0 so persisted output is byte-stable.
    if r == 0.0 { 0.0 } else { r }
}

pub(crate) fn round_time(t: f64) -> f64 {
    round_decimals(t, TIME_DECIMALS)
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Map `x` into `[0, 1]` by wrapping.
///
/// Whole positive overflow lands on `1.0` rather than `0.0`, so `t + k` for integer `k` reads
/// the same endpoint `t` did.
pub(crate) fn wrap_unit(x: f64) -> f64 {
    let frac = x - x.floor();
    if frac == 0.0 && x > 0.0 { 1.0 } else { frac }
}

/// Uniform grid time for sample `i` of `n` intervals.
pub(crate) fn grid_time(i: usize, n: usize) -> f64 {
    round_time(i as f64 / n as f64)
}

pub(crate) fn dmx_from_unit(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
