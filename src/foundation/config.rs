use std::path::Path;

use crate::{
    animation::ease::Ease,
    curve::factory::CurveFactory,
    foundation::error::{ChoreoError, ChoreoResult},
};

/// Compile-pass settings. Immutable once loaded; read through accessors.
///
/// Defaults: 32 samples per cycle clamped to `[8, 256]`, 50 ms minimum gap, RDP epsilon of
/// 0.5 DMX, parallel per-fixture compilation on the global rayon pool, uncapped gap fills
/// with the dimmer closed and `in_out_sine` easing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    samples_per_cycle: usize,
    min_samples: usize,
    max_samples: usize,
    min_gap_ms: f64,
    /// DMX units; `0` disables simplification.
    simplify_epsilon: f64,
    parallel: bool,
    threads: Option<usize>,
    fill_max_ms: Option<f64>,
    fill_dimmer_dmx: u8,
    fill_ease: Ease,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            samples_per_cycle: 32,
            min_samples: 8,
            max_samples: 256,
            min_gap_ms: 50.0,
            simplify_epsilon: 0.5,
            parallel: true,
            threads: None,
            fill_max_ms: None,
            fill_dimmer_dmx: 0,
            fill_ease: Ease::InOutSine,
        }
    }
}

impl CompileConfig {
    pub fn from_json_str(s: &str) -> ChoreoResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| ChoreoError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ChoreoResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ChoreoError::Other(anyhow::anyhow!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ChoreoResult<()> {
        if self.samples_per_cycle < 2 {
            return Err(ChoreoError::validation("samples_per_cycle must be >= 2"));
        }
        if self.min_samples < 2 || self.max_samples < self.min_samples {
            return Err(ChoreoError::validation(format!(
                "sample bounds must satisfy 2 <= min_samples <= max_samples, got [{}, {}]",
                self.min_samples, self.max_samples
            )));
        }
        if !self.min_gap_ms.is_finite() || self.min_gap_ms < 0.0 {
            return Err(ChoreoError::validation("min_gap_ms must be finite and >= 0"));
        }
        if !self.simplify_epsilon.is_finite() || self.simplify_epsilon < 0.0 {
            return Err(ChoreoError::validation(
                "simplify_epsilon must be finite and >= 0",
            ));
        }
        if self.threads == Some(0) {
            return Err(ChoreoError::validation("threads must be >= 1 when set"));
        }
        if let Some(ms) = self.fill_max_ms
            && (!ms.is_finite() || ms <= 0.0)
        {
            return Err(ChoreoError::validation("fill_max_ms must be finite and > 0"));
        }
        Ok(())
    }

    pub fn samples_per_cycle(&self) -> usize {
        self.samples_per_cycle
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    pub fn min_gap_ms(&self) -> f64 {
        self.min_gap_ms
    }

    pub fn simplify_epsilon(&self) -> f64 {
        self.simplify_epsilon
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn threads(&self) -> Option<usize> {
        self.threads
    }

    pub fn fill_max_ms(&self) -> Option<f64> {
        self.fill_max_ms
    }

    pub fn fill_dimmer_dmx(&self) -> u8 {
        self.fill_dimmer_dmx
    }

    pub fn fill_ease(&self) -> Ease {
        self.fill_ease
    }

    pub fn curve_factory(&self) -> ChoreoResult<CurveFactory> {
        CurveFactory::new(self.samples_per_cycle, self.min_samples, self.max_samples)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_min_gap_ms(mut self, ms: f64) -> Self {
        self.min_gap_ms = ms;
        self
    }

    pub fn with_simplify_epsilon(mut self, epsilon: f64) -> Self {
        self.simplify_epsilon = epsilon;
        self
    }

    pub fn with_fill_max_ms(mut self, ms: Option<f64>) -> Self {
        self.fill_max_ms = ms;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
