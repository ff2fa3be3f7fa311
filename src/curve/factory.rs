use std::f64::consts::{PI, TAU};

use crate::{
    curve::{model::Curve, ops::sample},
    foundation::error::{ChoreoError, ChoreoResult},
};

/// How a generated `[0, 1]` curve should be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// Symmetric deviation around the neutral value `0.5`.
    Offset,
    /// Absolute position within `[0, 1]`.
    Absolute,
}

/// Periodic base shapes. Each full cycle spans `1 / cycles` of normalized time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "shape")]
pub enum WaveShape {
    Sine,
    Cosine,
    Triangle,
    Sawtooth,
    /// Square wave; `smoothing` in `[0, 1]` rounds the edges.
    Square { smoothing: f64 },
    RampUp,
    RampDown,
    /// `|sin|`, always above the floor.
    Bounce,
    /// Raised-cosine pulse occupying `duty` of each cycle.
    Pulse { duty: f64 },
    Hold { value: f64 },
}

impl WaveShape {
    pub fn kind(self) -> CurveKind {
        match self {
            Self::Sine | Self::Cosine | Self::Triangle | Self::Square { .. } | Self::Hold { .. } => {
                CurveKind::Offset
            }
            Self::Sawtooth | Self::RampUp | Self::RampDown | Self::Bounce | Self::Pulse { .. } => {
                CurveKind::Absolute
            }
        }
    }

    /// Value in `[0, 1]` at cycle phase `x` (any real; one cycle per unit).
    pub fn eval(self, x: f64) -> f64 {
        let frac = x - x.floor();
        match self {
            Self::Sine => 0.5 + 0.5 * (TAU * x).sin(),
            Self::Cosine => 0.5 + 0.5 * (TAU * x).cos(),
            Self::Triangle => {
                // Starts at the centre and rises, matching Sine's phase.
                let p = (frac + 0.25) % 1.0;
                if p < 0.5 { 2.0 * p } else { 2.0 - 2.0 * p }
            }
            Self::Sawtooth => frac,
            Self::Square { smoothing } => {
                // Clipped sine: edges soften as `smoothing` grows, a pure sine at 1.0.
                let s = (TAU * x).sin();
                let k = (PI * smoothing.clamp(0.0, 1.0) * 0.5).sin();
                let sq = if k <= 0.0 {
                    if s >= 0.0 { 1.0 } else { -1.0 }
                } else {
                    (s / k).clamp(-1.0, 1.0)
                };
                0.5 + 0.5 * sq
            }
            Self::RampUp => x.clamp(0.0, 1.0),
            Self::RampDown => 1.0 - x.clamp(0.0, 1.0),
            Self::Bounce => (PI * x).sin().abs(),
            Self::Pulse { duty } => {
                let duty = duty.clamp(0.0, 1.0);
                if duty <= 0.0 || frac >= duty {
                    0.0
                } else {
                    0.5 - 0.5 * (TAU * frac / duty).cos()
                }
            }
            Self::Hold { value } => value.clamp(0.0, 1.0),
        }
    }
}

/// Explicitly constructed curve generator owned by the compile context.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveFactory {
    samples_per_cycle: usize,
    min_samples: usize,
    max_samples: usize,
}

impl Default for CurveFactory {
    fn default() -> Self {
        Self {
            samples_per_cycle: 32,
            min_samples: 8,
            max_samples: 256,
        }
    }
}

impl CurveFactory {
    pub fn new(
        samples_per_cycle: usize,
        min_samples: usize,
        max_samples: usize,
    ) -> ChoreoResult<Self> {
        if samples_per_cycle < 2 {
            return Err(ChoreoError::invalid_argument(
                "samples_per_cycle must be >= 2",
            ));
        }
        if min_samples < 2 || max_samples < min_samples {
            return Err(ChoreoError::invalid_argument(format!(
                "sample bounds must satisfy 2 <= min <= max, got [{min_samples}, {max_samples}]"
            )));
        }
        Ok(Self {
            samples_per_cycle,
            min_samples,
            max_samples,
        })
    }

    /// Grid size (intervals) for a curve of `cycles` periods.
    pub fn samples_for(&self, cycles: f64) -> usize {
        let cycles = if cycles.is_finite() { cycles.max(0.0) } else { 1.0 };
        let want = (cycles * self.samples_per_cycle as f64).ceil() as usize;
        want.clamp(self.min_samples, self.max_samples)
    }

    /// Sample `shape` for `cycles` periods starting at cycle phase `phase`.
    pub fn wave(&self, shape: WaveShape, cycles: f64, phase: f64, n: usize) -> ChoreoResult<Curve> {
        if !cycles.is_finite() || cycles < 0.0 {
            return Err(ChoreoError::invalid_argument(format!(
                "cycles must be finite and >= 0, got {cycles}"
            )));
        }
        if !phase.is_finite() {
            return Err(ChoreoError::invalid_argument("wave phase must be finite"));
        }
        match shape {
            // Ramps are one-shot across the whole window.
            WaveShape::RampUp | WaveShape::RampDown => sample(|t| shape.eval(t), n),
            _ => sample(|t| shape.eval(t * cycles + phase), n),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/curve/factory.rs"]
mod tests;
