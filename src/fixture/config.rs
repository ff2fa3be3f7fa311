use std::collections::BTreeSet;

use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Total mechanical travel of each axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanTiltRange {
    pub pan_range_deg: f64,
    pub tilt_range_deg: f64,
}

impl Default for PanTiltRange {
    fn default() -> Self {
        Self {
            pan_range_deg: 540.0,
            tilt_range_deg: 270.0,
        }
    }
}

impl PanTiltRange {
    pub fn validate(&self) -> ChoreoResult<()> {
        for (name, v) in [
            ("pan_range_deg", self.pan_range_deg),
            ("tilt_range_deg", self.tilt_range_deg),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ChoreoError::validation(format!(
                    "{name} must be finite and > 0, got {v}"
                )));
            }
        }
        Ok(())
    }

    pub fn pan_half(&self) -> f64 {
        self.pan_range_deg / 2.0
    }

    pub fn tilt_half(&self) -> f64 {
        self.tilt_range_deg / 2.0
    }
}

/// Where the fixture's mechanical front/level reference sits on the DMX scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Orientation {
    #[serde(default = "default_mid_dmx")]
    pub pan_front_dmx: u8,
    #[serde(default = "default_mid_dmx")]
    pub tilt_level_dmx: u8,
    /// Hung or mounted mirrored: positive degrees map to decreasing DMX.
    #[serde(default)]
    pub pan_inverted: bool,
    #[serde(default)]
    pub tilt_inverted: bool,
}

fn default_mid_dmx() -> u8 {
    128
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            pan_front_dmx: 128,
            tilt_level_dmx: 128,
            pan_inverted: false,
            tilt_inverted: false,
        }
    }
}

/// Hard DMX clamp bounds per axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MovementLimits {
    #[serde(default)]
    pub pan_min: u8,
    #[serde(default = "default_max_dmx")]
    pub pan_max: u8,
    #[serde(default)]
    pub tilt_min: u8,
    #[serde(default = "default_max_dmx")]
    pub tilt_max: u8,
    /// Keep pan within ±90° of front so the beam never throws away from the audience.
    #[serde(default)]
    pub avoid_backward: bool,
}

fn default_max_dmx() -> u8 {
    255
}

impl Default for MovementLimits {
    fn default() -> Self {
        Self {
            pan_min: 0,
            pan_max: 255,
            tilt_min: 0,
            tilt_max: 255,
            avoid_backward: false,
        }
    }
}

impl MovementLimits {
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.pan_min > self.pan_max {
            return Err(ChoreoError::validation(format!(
                "pan limits are inverted: [{}, {}]",
                self.pan_min, self.pan_max
            )));
        }
        if self.tilt_min > self.tilt_max {
            return Err(ChoreoError::validation(format!(
                "tilt limits are inverted: [{}, {}]",
                self.tilt_min, self.tilt_max
            )));
        }
        Ok(())
    }
}

/// 1-based DMX channel numbers for the channels the engine drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DmxChannelMap {
    pub pan: u16,
    pub tilt: u16,
    pub dimmer: u16,
}

impl DmxChannelMap {
    pub fn validate(&self) -> ChoreoResult<()> {
        let chans = [self.pan, self.tilt, self.dimmer];
        if chans.iter().any(|&c| c == 0 || c > 512) {
            return Err(ChoreoError::validation(format!(
                "DMX channels must be in 1..=512, got {chans:?}"
            )));
        }
        if chans.iter().collect::<BTreeSet<_>>().len() != chans.len() {
            return Err(ChoreoError::validation(format!(
                "DMX channels must be distinct, got {chans:?}"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FixtureConfig {
    pub fixture_id: String,
    pub channels: DmxChannelMap,
    #[serde(default)]
    pub range: PanTiltRange,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub limits: MovementLimits,
    /// Stage role token (e.g. `FRONT_LEFT`) consumed by geometry handlers.
    #[serde(default)]
    pub role: Option<String>,
}

impl FixtureConfig {
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.fixture_id.trim().is_empty() {
            return Err(ChoreoError::validation("fixture_id must be non-empty"));
        }
        self.channels.validate()?;
        self.range.validate()?;
        self.limits.validate()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FixtureGroup {
    pub group_id: String,
    pub fixtures: Vec<FixtureConfig>,
}

impl FixtureGroup {
    pub fn validate(&self) -> ChoreoResult<()> {
        let mut seen = BTreeSet::new();
        for f in &self.fixtures {
            f.validate()?;
            if !seen.insert(f.fixture_id.as_str()) {
                return Err(ChoreoError::validation(format!(
                    "duplicate fixture_id '{}' in group '{}'",
                    f.fixture_id, self.group_id
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, fixture_id: &str) -> ChoreoResult<&FixtureConfig> {
        self.fixtures
            .iter()
            .find(|f| f.fixture_id == fixture_id)
            .ok_or_else(|| {
                ChoreoError::unknown(
                    "fixture",
                    fixture_id,
                    self.fixtures.iter().map(|f| f.fixture_id.clone()),
                )
            })
    }

    /// Position of a fixture within the group, used for spreads.
    pub fn index_of(&self, fixture_id: &str) -> Option<usize> {
        self.fixtures.iter().position(|f| f.fixture_id == fixture_id)
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fixture/config.rs"]
mod tests;
