//! Point-count reduction for export. Both passes keep the first and last point.

use crate::{
    curve::model::{Curve, CurvePoint},
    foundation::error::{ChoreoError, ChoreoResult},
};

/// Multipliers applied to `(t, v)` before measuring distance.
///
/// Normalized time and DMX-scale values live on very different scales; weighting lets a
/// caller decide how much a wobble in one axis counts against the other.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DistanceScale {
    pub t: f64,
    pub v: f64,
}

impl Default for DistanceScale {
    fn default() -> Self {
        Self { t: 1.0, v: 1.0 }
    }
}

impl DistanceScale {
    fn validate(self) -> ChoreoResult<Self> {
        if !(self.t.is_finite() && self.v.is_finite()) || self.t < 0.0 || self.v < 0.0 {
            return Err(ChoreoError::invalid_argument(
                "distance scale factors must be finite and >= 0",
            ));
        }
        Ok(self)
    }
}

/// Greedy single pass: drop each interior point whose distance to the line through the last
/// kept point and its right neighbour is `<= epsilon`.
pub fn simplify_near_collinear(curve: &Curve, epsilon: f64) -> ChoreoResult<Curve> {
    let tol = tolerance(epsilon)?;
    let pts = curve.points();
    let scale = DistanceScale::default();
    let mut kept = Vec::with_capacity(pts.len());
    kept.push(pts[0]);
    for i in 1..pts.len() - 1 {
        let anchor = kept[kept.len() - 1];
        if perpendicular_distance(pts[i], anchor, pts[i + 1], scale) > tol {
            kept.push(pts[i]);
        }
    }
    kept.push(pts[pts.len() - 1]);
    Ok(Curve::from_points_unchecked(kept))
}

/// Ramer–Douglas–Peucker in scaled `(t, v)` space.
///
/// Points sharing a `t` are collapsed first (keeping the later one, except at `t = first.t`)
/// so the output has strictly increasing time. Idempotent for a fixed `epsilon`.
pub fn simplify_rdp(curve: &Curve, epsilon: f64, scale: DistanceScale) -> ChoreoResult<Curve> {
    let tol = tolerance(epsilon)?;
    let scale = scale.validate()?;
    let pts = dedupe_times(curve.points());
    if pts.len() <= 2 {
        return Ok(Curve::from_points_unchecked(endpoints(curve, &pts)));
    }

    let mut keep = vec![false; pts.len()];
    keep[0] = true;
    keep[pts.len() - 1] = true;

    // Explicit stack instead of recursion.
    let mut stack = vec![(0usize, pts.len() - 1)];
    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let mut max_d = -1.0;
        let mut max_i = lo;
        for (i, &p) in pts.iter().enumerate().take(hi).skip(lo + 1) {
            let d = perpendicular_distance(p, pts[lo], pts[hi], scale);
            if d > max_d {
                max_d = d;
                max_i = i;
            }
        }
        if max_d > tol {
            keep[max_i] = true;
            stack.push((max_i, hi));
            stack.push((lo, max_i));
        }
    }

    Ok(Curve::from_points_unchecked(
        pts.into_iter()
            .zip(keep)
            .filter_map(|(p, k)| k.then_some(p))
            .collect(),
    ))
}

/// Epsilon below machine precision degrades to an exact collinearity test.
fn tolerance(epsilon: f64) -> ChoreoResult<f64> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(ChoreoError::invalid_argument(format!(
            "simplify epsilon must be finite and >= 0, got {epsilon}"
        )));
    }
    Ok(epsilon.max(f64::EPSILON))
}

fn dedupe_times(points: &[CurvePoint]) -> Vec<CurvePoint> {
    let mut out: Vec<CurvePoint> = Vec::with_capacity(points.len());
    for &p in points {
        let len = out.len();
        match out.last_mut() {
            Some(prev) if prev.t == p.t => {
                if len > 1 {
                    *prev = p;
                }
            }
            _ => out.push(p),
        }
    }
    out
}

fn endpoints(curve: &Curve, deduped: &[CurvePoint]) -> Vec<CurvePoint> {
    if deduped.len() == 2 {
        deduped.to_vec()
    } else {
        vec![curve.first(), curve.last()]
    }
}

fn perpendicular_distance(p: CurvePoint, a: CurvePoint, b: CurvePoint, s: DistanceScale) -> f64 {
    let (px, py) = (p.t * s.t, p.v * s.v);
    let (ax, ay) = (a.t * s.t, a.v * s.v);
    let (bx, by) = (b.t * s.t, b.v * s.v);
    let (dx, dy) = (bx - ax, by - ay);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return (px - ax).hypot(py - ay);
    }
    ((px - ax) * dy - (py - ay) * dx).abs() / len
}

#[cfg(test)]
#[path = "../../tests/unit/curve/simplify.rs"]
mod tests;
