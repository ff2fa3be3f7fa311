use std::collections::BTreeMap;

use crate::{
    curve::{
        factory::{CurveFactory, WaveShape},
        model::Curve,
        ops::map_values,
    },
    foundation::{
        diagnostics::Diagnostics,
        error::{ChoreoError, ChoreoResult},
    },
    handlers::registry::{Intensity, MovementCurves, MovementHandler, MovementParams},
};

/// Degrees of deviation represented by a full-scale offset (`0.0` or `1.0`).
pub const OFFSET_FULL_SCALE_DEG: f64 = 180.0;

/// Per-level motion size and speed for a pattern.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CategoricalParams {
    /// Peak deviation from centre in normalized units, `0..=0.5`.
    pub amplitude: f64,
    /// Multiplier on the requested cycle count.
    #[serde(default = "one")]
    pub frequency: f64,
}

fn one() -> f64 {
    1.0
}

impl CategoricalParams {
    pub const fn new(amplitude: f64, frequency: f64) -> Self {
        Self {
            amplitude,
            frequency,
        }
    }
}

/// A named movement: one base shape per axis plus a table of intensity levels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MovementPattern {
    pub id: String,
    pub pan: WaveShape,
    pub tilt: WaveShape,
    /// Tilt cycles per pan cycle.
    #[serde(default = "one")]
    pub tilt_cycle_ratio: f64,
    /// Tilt phase lead in cycles.
    #[serde(default)]
    pub tilt_phase: f64,
    /// Tilt amplitude as a fraction of pan amplitude.
    #[serde(default = "one")]
    pub tilt_amplitude_ratio: f64,
    pub levels: BTreeMap<Intensity, CategoricalParams>,
}

impl MovementPattern {
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.id.trim().is_empty() {
            return Err(ChoreoError::validation("movement pattern id must be non-empty"));
        }
        if !self.levels.contains_key(&Intensity::Smooth) {
            return Err(ChoreoError::validation(format!(
                "movement pattern '{}' must define the SMOOTH level",
                self.id
            )));
        }
        for (name, v) in [
            ("tilt_cycle_ratio", self.tilt_cycle_ratio),
            ("tilt_phase", self.tilt_phase),
            ("tilt_amplitude_ratio", self.tilt_amplitude_ratio),
        ] {
            if !v.is_finite() || (name != "tilt_phase" && v < 0.0) {
                return Err(ChoreoError::validation(format!(
                    "movement pattern '{}': {name} must be finite and >= 0",
                    self.id
                )));
            }
        }
        for (level, p) in &self.levels {
            if !(0.0..=0.5).contains(&p.amplitude) || !p.frequency.is_finite() || p.frequency < 0.0
            {
                return Err(ChoreoError::validation(format!(
                    "movement pattern '{}' level {level:?}: amplitude must be in [0, 0.5] and frequency >= 0",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Level parameters, falling back to SMOOTH when `intensity` is not defined.
    fn level(&self, intensity: Intensity, diags: &mut Diagnostics) -> CategoricalParams {
        if let Some(p) = self.levels.get(&intensity) {
            return *p;
        }
        diags.fallback(
            &self.id,
            format!("intensity {intensity:?} not defined; using SMOOTH"),
        );
        // validate() guarantees SMOOTH is present.
        self.levels
            .get(&Intensity::Smooth)
            .copied()
            .unwrap_or(CategoricalParams::new(0.0, 1.0))
    }
}

fn levels(table: &[(Intensity, f64, f64)]) -> BTreeMap<Intensity, CategoricalParams> {
    table
        .iter()
        .map(|&(i, a, f)| (i, CategoricalParams::new(a, f)))
        .collect()
}

#[derive(Clone, Debug, Default)]
pub struct MovementLibrary {
    patterns: BTreeMap<String, MovementPattern>,
}

impl MovementLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> ChoreoResult<Self> {
        use Intensity::*;
        let mut lib = Self::new();
        let standard = [
            (Slow, 0.08, 0.5),
            (Smooth, 0.12, 1.0),
            (Fast, 0.12, 2.0),
            (Dramatic, 0.25, 1.0),
            (Intense, 0.3, 2.0),
        ];
        let hold_levels = [(Smooth, 0.0, 1.0)];
        let defs = [
            ("sweep", WaveShape::Sine, WaveShape::Hold { value: 0.5 }, 1.0, 0.0, 1.0, &standard[..]),
            ("circle", WaveShape::Sine, WaveShape::Cosine, 1.0, 0.0, 1.0, &standard[..]),
            ("figure_eight", WaveShape::Sine, WaveShape::Sine, 2.0, 0.0, 0.5, &standard[..]),
            ("nod", WaveShape::Hold { value: 0.5 }, WaveShape::Sine, 1.0, 0.0, 0.6, &standard[..]),
            ("pendulum", WaveShape::Sine, WaveShape::Bounce, 2.0, 0.0, 0.3, &standard[..]),
            ("zigzag", WaveShape::Triangle, WaveShape::Square { smoothing: 0.4 }, 2.0, 0.0, 0.5, &standard[..]),
            ("wave", WaveShape::Sine, WaveShape::Sine, 1.0, 0.25, 0.5, &standard[..3]),
            ("hold", WaveShape::Hold { value: 0.5 }, WaveShape::Hold { value: 0.5 }, 1.0, 0.0, 1.0, &hold_levels[..]),
        ];
        for (id, pan, tilt, ratio, phase, amp_ratio, table) in defs {
            lib.insert(MovementPattern {
                id: id.to_string(),
                pan,
                tilt,
                tilt_cycle_ratio: ratio,
                tilt_phase: phase,
                tilt_amplitude_ratio: amp_ratio,
                levels: levels(table),
            })?;
        }
        Ok(lib)
    }

    /// Add or replace a pattern.
    pub fn insert(&mut self, pattern: MovementPattern) -> ChoreoResult<()> {
        pattern.validate()?;
        self.patterns.insert(pattern.id.clone(), pattern);
        Ok(())
    }

    pub fn get(&self, id: &str) -> ChoreoResult<&MovementPattern> {
        self.patterns
            .get(id)
            .ok_or_else(|| ChoreoError::unknown("movement", id, self.patterns.keys().cloned()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }
}

/// Library-backed handler answering for every pattern in its [`MovementLibrary`].
#[derive(Clone, Debug)]
pub struct DefaultMovementHandler {
    library: MovementLibrary,
    factory: CurveFactory,
}

impl DefaultMovementHandler {
    pub fn new(library: MovementLibrary, factory: CurveFactory) -> Self {
        Self { library, factory }
    }

    pub fn library(&self) -> &MovementLibrary {
        &self.library
    }
}

/// Rescale a curve centred on `0.5` so its peak deviation is `amplitude`.
///
/// Offset and absolute wave shapes are both read as deviations from `0.5`.
pub fn rescale_offset(curve: &Curve, amplitude: f64) -> Curve {
    let gain = amplitude / 0.5;
    map_values(curve, |v| (0.5 + (v - 0.5) * gain).clamp(0.0, 1.0))
}

impl MovementHandler for DefaultMovementHandler {
    fn handler_id(&self) -> &str {
        "library"
    }

    fn pattern_ids(&self) -> Vec<String> {
        self.library.ids().map(str::to_string).collect()
    }

    fn generate(
        &self,
        params: &MovementParams,
        n_samples: usize,
        cycles: f64,
        intensity: Intensity,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<MovementCurves> {
        let pattern = self.library.get(&params.pattern_id)?;
        let level = pattern.level(intensity, diags);

        let amplitude = match params.amplitude_degrees {
            Some(deg) if !deg.is_finite() || deg < 0.0 => {
                return Err(ChoreoError::invalid_argument(format!(
                    "amplitude_degrees must be finite and >= 0, got {deg}"
                )));
            }
            Some(deg) => deg / OFFSET_FULL_SCALE_DEG,
            None => level.amplitude,
        };
        if amplitude > 0.5 {
            diags.out_of_range(
                &pattern.id,
                format!("amplitude {amplitude:.3} exceeds full scale; limited to 0.5"),
            );
        }
        let amplitude = amplitude.min(0.5);

        let pan_cycles = cycles * level.frequency;
        let pan = self.factory.wave(pattern.pan, pan_cycles, 0.0, n_samples)?;
        let tilt = self.factory.wave(
            pattern.tilt,
            pan_cycles * pattern.tilt_cycle_ratio,
            pattern.tilt_phase,
            n_samples,
        )?;

        Ok(MovementCurves {
            pan: rescale_offset(&pan, amplitude),
            tilt: rescale_offset(&tilt, amplitude * pattern.tilt_amplitude_ratio),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handlers/movement.rs"]
mod tests;
