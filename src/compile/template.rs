use std::collections::BTreeSet;

use crate::{
    foundation::error::{ChoreoError, ChoreoResult},
    handlers::registry::Intensity,
    schedule::repeat::RepeatContract,
};

fn default_one() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Handler id plus its free-form params.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PatternRef {
    pub id: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl PatternRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: serde_json::Value::Null,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MovementSpec {
    pub id: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub amplitude_degrees: Option<f64>,
    /// Pattern cycles per step instance.
    #[serde(default = "default_one")]
    pub cycles: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DimmerSpec {
    pub id: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub min_norm: f64,
    #[serde(default = "default_one")]
    pub max_norm: f64,
    #[serde(default = "default_one")]
    pub cycles: f64,
}

/// Per-fixture time offset, as a fraction of the step.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum PhaseOffset {
    #[default]
    None,
    /// Same offset for every fixture.
    Fixed { offset: f64 },
    /// Fixture `i` of `n` gets `total * i / n`; a chase across the group.
    Spread { total: f64 },
}

impl PhaseOffset {
    pub fn offset_for(self, fixture_index: usize, fixture_count: usize) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Fixed { offset } => offset,
            Self::Spread { total } if fixture_count > 0 => {
                total * fixture_index as f64 / fixture_count as f64
            }
            Self::Spread { .. } => 0.0,
        }
    }

    fn is_finite(self) -> bool {
        match self {
            Self::None => true,
            Self::Fixed { offset: v } | Self::Spread { total: v } => v.is_finite(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TemplateStep {
    pub step_id: String,
    pub duration_bars: f64,
    pub geometry: PatternRef,
    pub movement: MovementSpec,
    pub dimmer: DimmerSpec,
    #[serde(default)]
    pub intensity: Intensity,
    #[serde(default)]
    pub phase: PhaseOffset,
    #[serde(default = "default_true")]
    pub phase_wrap: bool,
}

impl TemplateStep {
    pub fn validate(&self) -> ChoreoResult<()> {
        let id = &self.step_id;
        if id.trim().is_empty() {
            return Err(ChoreoError::validation("step_id must be non-empty"));
        }
        if !self.duration_bars.is_finite() || self.duration_bars <= 0.0 {
            return Err(ChoreoError::validation(format!(
                "step '{id}': duration_bars must be finite and > 0"
            )));
        }
        for (what, cycles) in [
            ("movement", self.movement.cycles),
            ("dimmer", self.dimmer.cycles),
        ] {
            if !cycles.is_finite() || cycles < 0.0 {
                return Err(ChoreoError::validation(format!(
                    "step '{id}': {what} cycles must be finite and >= 0"
                )));
            }
        }
        let (lo, hi) = (self.dimmer.min_norm, self.dimmer.max_norm);
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || hi < lo {
            return Err(ChoreoError::validation(format!(
                "step '{id}': dimmer range must satisfy 0 <= min <= max <= 1, got [{lo}, {hi}]"
            )));
        }
        if let Some(a) = self.movement.amplitude_degrees
            && (!a.is_finite() || a < 0.0)
        {
            return Err(ChoreoError::validation(format!(
                "step '{id}': amplitude_degrees must be finite and >= 0"
            )));
        }
        if !self.phase.is_finite() {
            return Err(ChoreoError::validation(format!(
                "step '{id}': phase offset must be finite"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    pub template_id: String,
    pub steps: Vec<TemplateStep>,
    #[serde(default)]
    pub repeat: Option<RepeatContract>,
}

impl Template {
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.steps.is_empty() {
            return Err(ChoreoError::validation(format!(
                "template '{}' has no steps",
                self.template_id
            )));
        }
        let mut seen = BTreeSet::new();
        for step in &self.steps {
            step.validate()?;
            if !seen.insert(step.step_id.as_str()) {
                return Err(ChoreoError::validation(format!(
                    "template '{}': duplicate step id '{}'",
                    self.template_id, step.step_id
                )));
            }
        }
        if let Some(repeat) = &self.repeat {
            repeat.validate()?;
            for id in repeat.referenced_step_ids() {
                if !seen.contains(id) {
                    return Err(ChoreoError::validation(format!(
                        "template '{}': repeat references unknown step '{id}'",
                        self.template_id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn step(&self, step_id: &str) -> ChoreoResult<&TemplateStep> {
        self.steps
            .iter()
            .find(|s| s.step_id == step_id)
            .ok_or_else(|| {
                ChoreoError::unknown("step", step_id, self.steps.iter().map(|s| s.step_id.clone()))
            })
    }

    /// Natural length of the loop body, in the contract's step order.
    pub fn loop_durations(&self) -> ChoreoResult<Option<Vec<f64>>> {
        let Some(repeat) = &self.repeat else {
            return Ok(None);
        };
        repeat
            .loop_step_ids
            .iter()
            .map(|id| self.step(id).map(|s| s.duration_bars))
            .collect::<ChoreoResult<Vec<_>>>()
            .map(Some)
    }

    pub fn total_bars(&self) -> f64 {
        self.steps.iter().map(|s| s.duration_bars).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/template.rs"]
mod tests;
