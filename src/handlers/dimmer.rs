use crate::{
    curve::{
        factory::{CurveFactory, WaveShape},
        model::Curve,
        ops::{sample, scale_to_range},
    },
    foundation::error::{ChoreoError, ChoreoResult},
    handlers::registry::{DimmerHandler, Intensity, parse_params},
};

pub(crate) fn builtin_dimmers(factory: &CurveFactory) -> Vec<Box<dyn DimmerHandler>> {
    vec![
        Box::new(FadeDimmer::fade_in(factory.clone())),
        Box::new(FadeDimmer::fade_out(factory.clone())),
        Box::new(PulseDimmer::new(factory.clone())),
        Box::new(HoldDimmer),
    ]
}

fn check_bounds(min_norm: f64, max_norm: f64) -> ChoreoResult<()> {
    if !min_norm.is_finite() || !max_norm.is_finite() {
        return Err(ChoreoError::invalid_argument("dimmer bounds must be finite"));
    }
    if max_norm < min_norm {
        return Err(ChoreoError::invalid_argument(format!(
            "dimmer max_norm {max_norm} is below min_norm {min_norm}"
        )));
    }
    if min_norm < 0.0 || max_norm > 1.0 {
        return Err(ChoreoError::invalid_argument(format!(
            "dimmer bounds must lie in [0, 1], got [{min_norm}, {max_norm}]"
        )));
    }
    Ok(())
}

/// One-shot ramp across the step window.
#[derive(Clone, Debug)]
pub struct FadeDimmer {
    id: &'static str,
    shape: WaveShape,
    factory: CurveFactory,
}

impl FadeDimmer {
    pub fn fade_in(factory: CurveFactory) -> Self {
        Self {
            id: "fade_in",
            shape: WaveShape::RampUp,
            factory,
        }
    }

    pub fn fade_out(factory: CurveFactory) -> Self {
        Self {
            id: "fade_out",
            shape: WaveShape::RampDown,
            factory,
        }
    }
}

impl DimmerHandler for FadeDimmer {
    fn handler_id(&self) -> &str {
        self.id
    }

    fn generate(
        &self,
        _params: &serde_json::Value,
        n_samples: usize,
        _cycles: f64,
        _intensity: Intensity,
        min_norm: f64,
        max_norm: f64,
    ) -> ChoreoResult<Curve> {
        check_bounds(min_norm, max_norm)?;
        let ramp = self.factory.wave(self.shape, 1.0, 0.0, n_samples)?;
        scale_to_range(&ramp, min_norm, max_norm)
    }
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PulseParams {
    /// Fraction of each cycle spent lit; `None` gives a continuous breathing sine.
    duty: Option<f64>,
}

/// Periodic brightness pulse; intensity scales the rate.
#[derive(Clone, Debug)]
pub struct PulseDimmer {
    factory: CurveFactory,
}

impl PulseDimmer {
    pub fn new(factory: CurveFactory) -> Self {
        Self { factory }
    }
}

impl DimmerHandler for PulseDimmer {
    fn handler_id(&self) -> &str {
        "pulse"
    }

    fn generate(
        &self,
        params: &serde_json::Value,
        n_samples: usize,
        cycles: f64,
        intensity: Intensity,
        min_norm: f64,
        max_norm: f64,
    ) -> ChoreoResult<Curve> {
        check_bounds(min_norm, max_norm)?;
        let p: PulseParams = parse_params(self.handler_id(), params)?;
        let cycles = cycles * intensity.rate();
        let wave = match p.duty {
            Some(duty) if !(0.0..=1.0).contains(&duty) => {
                return Err(ChoreoError::invalid_argument(format!(
                    "pulse duty must be in [0, 1], got {duty}"
                )));
            }
            Some(duty) => self
                .factory
                .wave(WaveShape::Pulse { duty }, cycles, 0.0, n_samples)?,
            // Phase -0.25 starts the sine at its trough, so each cycle begins dark.
            None => self.factory.wave(WaveShape::Sine, cycles, -0.25, n_samples)?,
        };
        scale_to_range(&wave, min_norm, max_norm)
    }
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HoldParams {
    /// Level within `[min_norm, max_norm]`; defaults to `max_norm`.
    level: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HoldDimmer;

impl DimmerHandler for HoldDimmer {
    fn handler_id(&self) -> &str {
        "hold"
    }

    fn generate(
        &self,
        params: &serde_json::Value,
        n_samples: usize,
        _cycles: f64,
        _intensity: Intensity,
        min_norm: f64,
        max_norm: f64,
    ) -> ChoreoResult<Curve> {
        check_bounds(min_norm, max_norm)?;
        let p: HoldParams = parse_params(self.handler_id(), params)?;
        let level = match p.level {
            Some(v) if !v.is_finite() => {
                return Err(ChoreoError::invalid_argument("hold level must be finite"));
            }
            Some(v) => v.clamp(min_norm, max_norm),
            None => max_norm,
        };
        sample(|_| level, n_samples)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handlers/dimmer.rs"]
mod tests;
