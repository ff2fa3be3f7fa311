use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Pan/tilt angle pair in degrees, relative to the fixture's front/level reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanTilt {
    pub pan_deg: f64,
    pub tilt_deg: f64,
}

impl PanTilt {
    pub const fn new(pan_deg: f64, tilt_deg: f64) -> Self {
        Self { pan_deg, tilt_deg }
    }

    pub fn offset(self, pan_deg: f64, tilt_deg: f64) -> Self {
        Self::new(self.pan_deg + pan_deg, self.tilt_deg + tilt_deg)
    }
}

/// Pose in normalized `[0, 1]²` space; `0.5` is the centre of each axis' travel.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormPose {
    pub pan: f64,
    pub tilt: f64,
}

impl NormPose {
    pub const CENTER: Self = Self {
        pan: 0.5,
        tilt: 0.5,
    };

    pub fn new(pan: f64, tilt: f64) -> Self {
        Self {
            pan: pan.clamp(0.0, 1.0),
            tilt: tilt.clamp(0.0, 1.0),
        }
    }
}

/// Constant-tempo bar/millisecond conversion.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BeatGrid {
    pub bpm: f64,
    #[serde(default = "default_beats_per_bar")]
    pub beats_per_bar: u32,
    /// Song time of bar 0, beat 0.
    #[serde(default)]
    pub offset_ms: f64,
}

fn default_beats_per_bar() -> u32 {
    4
}

impl BeatGrid {
    pub fn new(bpm: f64, beats_per_bar: u32, offset_ms: f64) -> ChoreoResult<Self> {
        let grid = Self {
            bpm,
            beats_per_bar,
            offset_ms,
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> ChoreoResult<()> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(ChoreoError::validation("BeatGrid bpm must be finite and > 0"));
        }
        if self.beats_per_bar == 0 {
            return Err(ChoreoError::validation("BeatGrid beats_per_bar must be > 0"));
        }
        if !self.offset_ms.is_finite() {
            return Err(ChoreoError::validation("BeatGrid offset_ms must be finite"));
        }
        Ok(())
    }

    pub fn ms_per_bar(&self) -> f64 {
        60_000.0 / self.bpm * f64::from(self.beats_per_bar)
    }

    /// Absolute song time of a bar position.
    pub fn bars_to_ms(&self, bars: f64) -> f64 {
        self.offset_ms + bars * self.ms_per_bar()
    }

    pub fn ms_to_bars(&self, ms: f64) -> f64 {
        (ms - self.offset_ms) / self.ms_per_bar()
    }

    /// Length in bars of a song-time span.
    pub fn span_bars(&self, start_ms: f64, end_ms: f64) -> f64 {
        (end_ms - start_ms) / self.ms_per_bar()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
