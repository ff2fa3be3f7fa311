use crate::foundation::{
    error::{ChoreoError, ChoreoResult},
    math::{grid_time, lerp},
};

/// One `(t, v)` sample. `t` is normalized time in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurvePoint {
    pub t: f64,
    pub v: f64,
}

impl CurvePoint {
    pub const fn new(t: f64, v: f64) -> Self {
        Self { t, v }
    }
}

/// Ordered point sequence with non-decreasing `t` and at least two points.
///
/// Curves are values: every engine operation returns a new curve.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<CurvePoint>", into = "Vec<CurvePoint>")]
pub struct Curve {
    points: Vec<CurvePoint>,
}

impl Curve {
    pub fn new(points: Vec<CurvePoint>) -> ChoreoResult<Self> {
        if points.len() < 2 {
            return Err(ChoreoError::invalid_argument(format!(
                "curve needs at least 2 points, got {}",
                points.len()
            )));
        }
        for (i, p) in points.iter().enumerate() {
            if !p.t.is_finite() || !p.v.is_finite() {
                return Err(ChoreoError::invalid_argument(format!(
                    "curve point {i} is not finite: ({}, {})",
                    p.t, p.v
                )));
            }
        }
        if !points.windows(2).all(|w| w[0].t <= w[1].t) {
            return Err(ChoreoError::invalid_argument(
                "curve point times must be non-decreasing",
            ));
        }
        Ok(Self { points })
    }

    /// Uniform grid curve from `n + 1` values, `t_i = i / n`.
    pub fn from_grid_values(values: &[f64]) -> ChoreoResult<Self> {
        if values.len() < 2 {
            return Err(ChoreoError::invalid_argument(
                "grid curve needs at least 2 values",
            ));
        }
        let n = values.len() - 1;
        Self::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| CurvePoint::new(grid_time(i, n), v))
                .collect(),
        )
    }

    pub fn constant(v: f64) -> Self {
        Self {
            points: vec![CurvePoint::new(0.0, v), CurvePoint::new(1.0, v)],
        }
    }

    pub(crate) fn from_points_unchecked(points: Vec<CurvePoint>) -> Self {
        debug_assert!(points.len() >= 2);
        Self { points }
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> CurvePoint {
        self.points[0]
    }

    pub fn last(&self) -> CurvePoint {
        self.points[self.points.len() - 1]
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.v).collect()
    }

    pub fn value_at(&self, t: f64) -> f64 {
        interpolate(&self.points, t)
    }

    /// `Some(n)` if the points sit on the `i / n` grid, exact or rounded to the stored
    /// time precision.
    pub fn uniform_grid_size(&self) -> Option<usize> {
        let n = self.points.len() - 1;
        self.points
            .iter()
            .enumerate()
            .all(|(i, p)| {
                (p.t - grid_time(i, n)).abs() <= 1e-9
                    || (p.t - i as f64 / n as f64).abs() <= 1e-9
            })
            .then_some(n)
    }

    pub fn min_max(&self) -> (f64, f64) {
        self.points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.v), hi.max(p.v))
            })
    }

    pub fn is_flat(&self) -> bool {
        let (lo, hi) = self.min_max();
        hi - lo <= f64::EPSILON
    }
}

impl TryFrom<Vec<CurvePoint>> for Curve {
    type Error = ChoreoError;

    fn try_from(points: Vec<CurvePoint>) -> ChoreoResult<Self> {
        Self::new(points)
    }
}

impl From<Curve> for Vec<CurvePoint> {
    fn from(curve: Curve) -> Self {
        curve.points
    }
}

/// Linear interpolation over points sorted by `t`; clamps outside the covered range.
///
/// Returns `0.0` for an empty slice.
pub fn interpolate(points: &[CurvePoint], t: f64) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if t <= first.t {
        return first.v;
    }
    if t >= last.t {
        return last.v;
    }
    // First index with p.t > t; always in 1..len here.
    let hi = points.partition_point(|p| p.t <= t);
    let a = points[hi - 1];
    let b = points[hi];
    let span = b.t - a.t;
    if span <= 0.0 {
        return b.v;
    }
    lerp(a.v, b.v, (t - a.t) / span)
}

#[cfg(test)]
#[path = "../../tests/unit/curve/model.rs"]
mod tests;
