use std::collections::BTreeMap;

use crate::{
    fixture::config::PanTiltRange,
    foundation::{
        core::{NormPose, PanTilt},
        diagnostics::Diagnostics,
        error::{ChoreoError, ChoreoResult},
    },
};

/// Built-in pose table. Pan is positive to stage right, tilt positive upward from level.
pub const STANDARD_POSES: &[(&str, PanTilt)] = &[
    ("FORWARD", PanTilt::new(0.0, 0.0)),
    ("HORIZON", PanTilt::new(0.0, 0.0)),
    ("CENTER", PanTilt::new(0.0, -15.0)),
    ("AUDIENCE", PanTilt::new(0.0, -10.0)),
    ("LEFT", PanTilt::new(-45.0, 0.0)),
    ("RIGHT", PanTilt::new(45.0, 0.0)),
    ("FAR_LEFT", PanTilt::new(-90.0, 0.0)),
    ("FAR_RIGHT", PanTilt::new(90.0, 0.0)),
    ("CROSS_LEFT", PanTilt::new(-30.0, -15.0)),
    ("CROSS_RIGHT", PanTilt::new(30.0, -15.0)),
    ("UP", PanTilt::new(0.0, 45.0)),
    ("SKY", PanTilt::new(0.0, 80.0)),
    ("DOWN", PanTilt::new(0.0, -45.0)),
    ("FLOOR", PanTilt::new(0.0, -80.0)),
];

/// Pose used when nothing else resolves: pan from `CENTER`, tilt from `HORIZON`.
pub const DEFAULT_PAN_POSE: &str = "CENTER";
pub const DEFAULT_TILT_POSE: &str = "HORIZON";

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

/// Named pose library bound to a pan/tilt range.
#[derive(Clone, Debug)]
pub struct PoseResolver {
    poses: BTreeMap<String, PanTilt>,
    range: PanTiltRange,
}

impl PoseResolver {
    pub fn standard(range: PanTiltRange) -> Self {
        Self {
            poses: STANDARD_POSES
                .iter()
                .map(|(name, pose)| ((*name).to_string(), *pose))
                .collect(),
            range,
        }
    }

    /// Standard set, then `overrides` (replace existing names), then `custom` additions
    /// (first binding wins; later duplicates are reported and ignored).
    pub fn with_sources(
        range: PanTiltRange,
        overrides: &BTreeMap<String, PanTilt>,
        custom: &[(String, PanTilt)],
        diags: &mut Diagnostics,
    ) -> ChoreoResult<Self> {
        let mut resolver = Self::standard(range);
        for (name, pose) in overrides {
            resolver.poses.insert(normalize_name(name), checked(name, *pose)?);
        }
        for (name, pose) in custom {
            let key = normalize_name(name);
            let pose = checked(name, *pose)?;
            if let Some(existing) = resolver.poses.get(&key) {
                if *existing != pose {
                    diags.conflict(
                        &key,
                        format!("custom pose ignored; '{key}' is already bound to {existing:?}"),
                    );
                }
                continue;
            }
            resolver.poses.insert(key, pose);
        }
        Ok(resolver)
    }

    /// Same pose table, validated against another fixture's travel.
    pub fn for_range(&self, range: PanTiltRange) -> Self {
        Self {
            poses: self.poses.clone(),
            range,
        }
    }

    pub fn range(&self) -> PanTiltRange {
        self.range
    }

    /// Rest pose: pan from [`DEFAULT_PAN_POSE`], tilt from [`DEFAULT_TILT_POSE`], clamped.
    pub fn default_pose(&self, diags: &mut Diagnostics) -> ChoreoResult<PanTilt> {
        let pan = self.raw_pose(DEFAULT_PAN_POSE)?;
        let tilt = self.raw_pose(DEFAULT_TILT_POSE)?;
        Ok(self.clamp_to_range(
            DEFAULT_PAN_POSE,
            PanTilt::new(pan.pan_deg, tilt.tilt_deg),
            diags,
        ))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.poses.contains_key(&normalize_name(name))
    }

    pub fn pose_names(&self) -> impl Iterator<Item = &str> {
        self.poses.keys().map(String::as_str)
    }

    /// Unvalidated table lookup.
    pub fn raw_pose(&self, name: &str) -> ChoreoResult<PanTilt> {
        self.poses
            .get(&normalize_name(name))
            .copied()
            .ok_or_else(|| ChoreoError::unknown("pose", name, self.poses.keys().cloned()))
    }

    /// Look up a pose and clamp it into `[-range/2, +range/2]` on each axis.
    pub fn resolve_pose(&self, name: &str, diags: &mut Diagnostics) -> ChoreoResult<PanTilt> {
        let pose = self.raw_pose(name)?;
        Ok(self.clamp_to_range(name, pose, diags))
    }

    /// Base pose composed with a geometry offset, then re-validated.
    pub fn resolve_pose_with_offset(
        &self,
        name: &str,
        pan_offset_deg: f64,
        tilt_offset_deg: f64,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<PanTilt> {
        if !pan_offset_deg.is_finite() || !tilt_offset_deg.is_finite() {
            return Err(ChoreoError::invalid_argument(format!(
                "pose offset must be finite, got ({pan_offset_deg}, {tilt_offset_deg})"
            )));
        }
        let pose = self.raw_pose(name)?.offset(pan_offset_deg, tilt_offset_deg);
        Ok(self.clamp_to_range(name, pose, diags))
    }

    pub fn clamp_to_range(&self, subject: &str, pose: PanTilt, diags: &mut Diagnostics) -> PanTilt {
        let (ph, th) = (self.range.pan_half(), self.range.tilt_half());
        let out = PanTilt::new(pose.pan_deg.clamp(-ph, ph), pose.tilt_deg.clamp(-th, th));
        if out != pose {
            diags.out_of_range(
                normalize_name(subject),
                format!(
                    "pose ({:.1}, {:.1})deg clamped to ({:.1}, {:.1})deg",
                    pose.pan_deg, pose.tilt_deg, out.pan_deg, out.tilt_deg
                ),
            );
        }
        out
    }

    /// Degrees to the normalized `[0, 1]` axis space used by geometry handlers.
    pub fn to_norm(&self, pose: PanTilt) -> NormPose {
        NormPose::new(
            pose.pan_deg / self.range.pan_range_deg + 0.5,
            pose.tilt_deg / self.range.tilt_range_deg + 0.5,
        )
    }

    pub fn from_norm(&self, pose: NormPose) -> PanTilt {
        PanTilt::new(
            (pose.pan - 0.5) * self.range.pan_range_deg,
            (pose.tilt - 0.5) * self.range.tilt_range_deg,
        )
    }
}

fn checked(name: &str, pose: PanTilt) -> ChoreoResult<PanTilt> {
    if !pose.pan_deg.is_finite() || !pose.tilt_deg.is_finite() {
        return Err(ChoreoError::validation(format!(
            "pose '{name}' has non-finite angles"
        )));
    }
    Ok(pose)
}

#[cfg(test)]
#[path = "../../tests/unit/fixture/pose.rs"]
mod tests;
