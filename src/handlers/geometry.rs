use std::collections::BTreeMap;

use crate::{
    fixture::pose::DEFAULT_PAN_POSE,
    foundation::{
        core::NormPose,
        diagnostics::Diagnostics,
        error::ChoreoResult,
    },
    handlers::registry::{GeometryCalibration, GeometryHandler, parse_params},
};

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RolePoseParams {
    /// Role name -> pose name.
    role_poses: BTreeMap<String, String>,
    /// Pose for fixtures whose role has no entry.
    pose: Option<String>,
    pan_offset_deg: f64,
    tilt_offset_deg: f64,
}

/// Pose chosen by fixture role, then a shared pose, then the default composite.
#[derive(Clone, Copy, Debug, Default)]
pub struct RolePoseGeometry;

impl GeometryHandler for RolePoseGeometry {
    fn handler_id(&self) -> &str {
        "role_pose"
    }

    fn resolve(
        &self,
        fixture_id: &str,
        role: Option<&str>,
        params: &serde_json::Value,
        calibration: &GeometryCalibration<'_>,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<NormPose> {
        let p: RolePoseParams = parse_params(self.handler_id(), params)?;
        let poses = calibration.poses;

        let by_role = role.and_then(|r| {
            p.role_poses
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(r.trim()))
                .map(|(_, v)| v.as_str())
        });
        let pose = match by_role.or(p.pose.as_deref()) {
            Some(name) => {
                poses.resolve_pose_with_offset(name, p.pan_offset_deg, p.tilt_offset_deg, diags)?
            }
            None => {
                let rest = poses.default_pose(diags)?;
                poses.clamp_to_range(
                    fixture_id,
                    rest.offset(p.pan_offset_deg, p.tilt_offset_deg),
                    diags,
                )
            }
        };
        Ok(poses.to_norm(pose))
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FanParams {
    pose: String,
    /// Total pan spread across the group, first fixture at `-spread/2`.
    spread_deg: f64,
    tilt_spread_deg: f64,
}

impl Default for FanParams {
    fn default() -> Self {
        Self {
            pose: DEFAULT_PAN_POSE.to_string(),
            spread_deg: 60.0,
            tilt_spread_deg: 0.0,
        }
    }
}

/// Spreads a group evenly around a centre pose by fixture index.
#[derive(Clone, Copy, Debug, Default)]
pub struct FanGeometry;

impl GeometryHandler for FanGeometry {
    fn handler_id(&self) -> &str {
        "fan"
    }

    fn resolve(
        &self,
        _fixture_id: &str,
        _role: Option<&str>,
        params: &serde_json::Value,
        calibration: &GeometryCalibration<'_>,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<NormPose> {
        let p: FanParams = parse_params(self.handler_id(), params)?;
        let position = if calibration.fixture_count <= 1 {
            0.0
        } else {
            calibration.fixture_index as f64 / (calibration.fixture_count - 1) as f64 - 0.5
        };
        let pose = calibration.poses.resolve_pose_with_offset(
            &p.pose,
            position * p.spread_deg,
            position * p.tilt_spread_deg,
            diags,
        )?;
        Ok(calibration.poses.to_norm(pose))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handlers/geometry.rs"]
mod tests;
