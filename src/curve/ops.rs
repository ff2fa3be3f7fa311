//! Pure curve transforms. Every function returns a new curve; inputs are never mutated.

use crate::{
    curve::model::{Curve, CurvePoint, interpolate},
    foundation::{
        error::{ChoreoError, ChoreoResult},
        math::{grid_time, lerp, round_time, wrap_unit},
    },
};

/// Evaluate `f` at `n + 1` uniformly spaced times in `[0, 1]`.
///
/// Times are rounded to 6 decimals so persisted output does not carry float jitter.
pub fn sample<F>(f: F, n: usize) -> ChoreoResult<Curve>
where
    F: Fn(f64) -> f64,
{
    if n < 2 {
        return Err(ChoreoError::invalid_argument(format!(
            "sample count must be >= 2, got {n}"
        )));
    }
    let mut points = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let t = grid_time(i, n);
        let v = f(t);
        if !v.is_finite() {
            return Err(ChoreoError::invalid_argument(format!(
                "sampled value at t={t} is not finite"
            )));
        }
        points.push(CurvePoint::new(t, v));
    }
    Ok(Curve::from_points_unchecked(points))
}

/// Linear-resample onto the uniform grid `t_i = i / n` (`n + 1` points).
pub fn resample_to_grid(curve: &Curve, n: usize) -> ChoreoResult<Curve> {
    let src = curve.points();
    sample(|t| interpolate(src, t), n)
}

/// Shift a curve in time by `offset`, reading `v(t + offset)`.
///
/// With `wrap` the offset is taken mod 1, otherwise it is clamped to `[0, 1]`. Uniform grid
/// curves rotate exactly; others are first resampled to a grid of `grid_samples` intervals
/// (default `max(2, len - 1)`). The last value is then forced to equal the first so the result
/// loops seamlessly.
pub fn time_shift(
    curve: &Curve,
    offset: f64,
    wrap: bool,
    grid_samples: Option<usize>,
) -> ChoreoResult<Curve> {
    if !offset.is_finite() {
        return Err(ChoreoError::invalid_argument("time shift offset must be finite"));
    }
    let offset = if wrap {
        offset.rem_euclid(1.0)
    } else {
        offset.clamp(0.0, 1.0)
    };

    let grid = match curve.uniform_grid_size() {
        Some(n) if n >= 2 && grid_samples.is_none_or(|want| want == n) => curve.clone(),
        _ => {
            let n = grid_samples.unwrap_or_else(|| curve.len().saturating_sub(1).max(2));
            resample_to_grid(curve, n)?
        }
    };

    let values = grid.values();
    let n = values.len() - 1;
    let steps = (offset * n as f64).round() as usize % n;
    let mut rotated: Vec<f64> = (0..n).map(|i| values[(i + steps) % n]).collect();
    rotated.push(rotated[0]);
    Curve::from_grid_values(&rotated)
}

/// `v -> 1 - v`.
pub fn invert(curve: &Curve) -> Curve {
    map_values(curve, |v| 1.0 - v)
}

pub fn clamp(curve: &Curve, vmin: f64, vmax: f64) -> ChoreoResult<Curve> {
    if vmax < vmin {
        return Err(ChoreoError::invalid_argument(format!(
            "clamp range is inverted: [{vmin}, {vmax}]"
        )));
    }
    Ok(map_values(curve, |v| v.clamp(vmin, vmax)))
}

/// Apply `envelope` onto `base`: `base.v * envelope(base.t)`. An empty envelope multiplies by 1.
pub fn multiply(base: &Curve, envelope: &[CurvePoint]) -> Curve {
    if envelope.is_empty() {
        return base.clone();
    }
    Curve::from_points_unchecked(
        base.points()
            .iter()
            .map(|p| CurvePoint::new(p.t, p.v * interpolate(envelope, p.t)))
            .collect(),
    )
}

/// Map `[0, 1]` values linearly onto `[lo, hi]`.
pub fn scale_to_range(curve: &Curve, lo: f64, hi: f64) -> ChoreoResult<Curve> {
    if hi < lo {
        return Err(ChoreoError::invalid_argument(format!(
            "target range is inverted: [{lo}, {hi}]"
        )));
    }
    Ok(map_values(curve, |v| lerp(lo, hi, v)))
}

/// Resample onto a uniform grid of `n_samples` intervals where each output sample at `t`
/// reads the source at `t + offset_norm` (wrapped mod 1, or clamped when `wrap` is false).
pub fn apply_phase_shift_samples(
    points: &[CurvePoint],
    offset_norm: f64,
    n_samples: usize,
    wrap: bool,
) -> ChoreoResult<Curve> {
    if points.is_empty() {
        return Err(ChoreoError::invalid_argument(
            "cannot phase shift an empty point sequence",
        ));
    }
    if n_samples < 2 {
        return Err(ChoreoError::invalid_argument(format!(
            "phase shift sample count must be >= 2, got {n_samples}"
        )));
    }
    if !offset_norm.is_finite() {
        return Err(ChoreoError::invalid_argument("phase offset must be finite"));
    }
    sample(
        |t| {
            let src_t = if wrap {
                wrap_unit(t + offset_norm)
            } else {
                (t + offset_norm).clamp(0.0, 1.0)
            };
            interpolate(points, src_t)
        },
        n_samples,
    )
}

/// Sub-range `[t_start, t_end]` of `curve`, re-normalized onto `[0, 1]`.
///
/// Interior points are kept as-is; the two boundaries are interpolated.
pub fn crop(curve: &Curve, t_start: f64, t_end: f64) -> ChoreoResult<Curve> {
    let t_start = t_start.clamp(0.0, 1.0);
    let t_end = t_end.clamp(0.0, 1.0);
    if t_end <= t_start {
        return Err(ChoreoError::invalid_argument(format!(
            "crop window is empty: [{t_start}, {t_end}]"
        )));
    }
    let span = t_end - t_start;
    let mut points = Vec::with_capacity(curve.len() + 2);
    points.push(CurvePoint::new(0.0, curve.value_at(t_start)));
    points.extend(
        curve
            .points()
            .iter()
            .filter(|p| p.t > t_start && p.t < t_end)
            .map(|p| CurvePoint::new(round_time((p.t - t_start) / span), p.v)),
    );
    points.push(CurvePoint::new(1.0, curve.value_at(t_end)));
    Curve::new(points)
}

pub fn map_values<F>(curve: &Curve, mut f: F) -> Curve
where
    F: FnMut(f64) -> f64,
{
    Curve::from_points_unchecked(
        curve
            .points()
            .iter()
            .map(|p| CurvePoint::new(p.t, f(p.v)))
            .collect(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/curve/ops.rs"]
mod tests;
