use crate::{
    curve::{model::Curve, ops::map_values},
    fixture::config::{FixtureConfig, MovementLimits, Orientation, PanTiltRange},
    foundation::{core::PanTilt, diagnostics::Diagnostics},
};

/// Widest pan swing either side of front allowed when `avoid_backward` is set.
const FORWARD_HEMISPHERE_DEG: f64 = 90.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Pan,
    Tilt,
}

impl Axis {
    fn as_str(self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Tilt => "tilt",
        }
    }
}

/// Degree <-> DMX conversion for one fixture, honouring range, orientation and limits.
///
/// Out-of-range requests are clamped and reported through [`Diagnostics`], never rejected.
#[derive(Clone, Debug)]
pub struct BoundaryEnforcer {
    fixture_id: String,
    range: PanTiltRange,
    orientation: Orientation,
    limits: MovementLimits,
}

impl BoundaryEnforcer {
    pub fn new(fixture: &FixtureConfig) -> Self {
        Self {
            fixture_id: fixture.fixture_id.clone(),
            range: fixture.range,
            orientation: fixture.orientation,
            limits: fixture.limits,
        }
    }

    pub fn fixture_id(&self) -> &str {
        &self.fixture_id
    }

    pub fn range(&self) -> PanTiltRange {
        self.range
    }

    fn dmx_per_deg(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Pan => 255.0 / self.range.pan_range_deg,
            Axis::Tilt => 255.0 / self.range.tilt_range_deg,
        }
    }

    fn reference(&self, axis: Axis) -> (f64, f64) {
        let (dmx, inverted) = match axis {
            Axis::Pan => (self.orientation.pan_front_dmx, self.orientation.pan_inverted),
            Axis::Tilt => (
                self.orientation.tilt_level_dmx,
                self.orientation.tilt_inverted,
            ),
        };
        (f64::from(dmx), if inverted { -1.0 } else { 1.0 })
    }

    /// Effective DMX bounds for an axis after limits and the backward-avoidance narrowing.
    pub fn dmx_bounds(&self, axis: Axis) -> (f64, f64) {
        let (lo, hi) = match axis {
            Axis::Pan => (self.limits.pan_min, self.limits.pan_max),
            Axis::Tilt => (self.limits.tilt_min, self.limits.tilt_max),
        };
        let (mut lo, mut hi) = (f64::from(lo), f64::from(hi));
        if axis == Axis::Pan && self.limits.avoid_backward {
            let (front, _) = self.reference(Axis::Pan);
            let swing = FORWARD_HEMISPHERE_DEG * self.dmx_per_deg(Axis::Pan);
            lo = lo.max(front - swing);
            hi = hi.min(front + swing);
            if lo > hi {
                // Limits lie entirely behind; keep the configured limits.
                lo = f64::from(self.limits.pan_min);
                hi = f64::from(self.limits.pan_max);
            }
        }
        (lo, hi)
    }

    /// Unrounded, unclamped DMX position for an angle.
    fn raw_dmx(&self, axis: Axis, deg: f64) -> f64 {
        let (ref_dmx, sign) = self.reference(axis);
        ref_dmx + sign * deg * self.dmx_per_deg(axis)
    }

    fn clamp_dmx(&self, axis: Axis, deg: f64) -> (u8, bool) {
        let deg = if deg.is_finite() { deg } else { 0.0 };
        let raw = self.raw_dmx(axis, deg);
        let (lo, hi) = self.dmx_bounds(axis);
        let clamped = raw.clamp(lo, hi);
        let out_of_range = raw < lo - 0.5 || raw > hi + 0.5;
        (clamped.round().clamp(0.0, 255.0) as u8, out_of_range)
    }

    pub fn to_dmx(&self, axis: Axis, deg: f64, diags: &mut Diagnostics) -> u8 {
        let (dmx, clamped) = self.clamp_dmx(axis, deg);
        if clamped || !deg.is_finite() {
            diags.out_of_range(
                &self.fixture_id,
                format!("{} {deg:.2}deg clamped to DMX {dmx}", axis.as_str()),
            );
        }
        dmx
    }

    pub fn pan_to_dmx(&self, deg: f64, diags: &mut Diagnostics) -> u8 {
        self.to_dmx(Axis::Pan, deg, diags)
    }

    pub fn tilt_to_dmx(&self, deg: f64, diags: &mut Diagnostics) -> u8 {
        self.to_dmx(Axis::Tilt, deg, diags)
    }

    pub fn pose_to_dmx(&self, pose: PanTilt, diags: &mut Diagnostics) -> (u8, u8) {
        (
            self.pan_to_dmx(pose.pan_deg, diags),
            self.tilt_to_dmx(pose.tilt_deg, diags),
        )
    }

    /// Convert a curve of angles to a curve of DMX values; one diagnostic per clamped curve.
    pub fn curve_to_dmx(&self, axis: Axis, degrees: &Curve, diags: &mut Diagnostics) -> Curve {
        let mut clamped = 0usize;
        let out = map_values(degrees, |deg| {
            let (dmx, c) = self.clamp_dmx(axis, deg);
            clamped += usize::from(c);
            f64::from(dmx)
        });
        if clamped > 0 {
            let (lo, hi) = degrees.min_max();
            diags.out_of_range(
                &self.fixture_id,
                format!(
                    "{} curve spanning [{lo:.2}, {hi:.2}]deg clamped at {clamped} of {} samples",
                    axis.as_str(),
                    degrees.len()
                ),
            );
        }
        out
    }

    pub fn dmx_to_deg(&self, axis: Axis, dmx: f64) -> f64 {
        let (ref_dmx, sign) = self.reference(axis);
        sign * (dmx - ref_dmx) / self.dmx_per_deg(axis)
    }

    pub fn dmx_to_pose(&self, pan_dmx: f64, tilt_dmx: f64) -> PanTilt {
        PanTilt::new(
            self.dmx_to_deg(Axis::Pan, pan_dmx),
            self.dmx_to_deg(Axis::Tilt, tilt_dmx),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fixture/boundary.rs"]
mod tests;
