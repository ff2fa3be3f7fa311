use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Remainders smaller than this are rounding noise, not a partial cycle.
const BAR_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepeatMode {
    /// Odd cycles play the loop body in reverse.
    #[default]
    PingPong,
    /// Always forward; the joiner step smooths the seam downstream.
    Joiner,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemainderPolicy {
    #[default]
    HoldLastPose,
    Truncate,
    FadeOut,
}

/// How consecutive instances meet.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum BoundaryTransition {
    #[default]
    Snap,
    /// End each instance `bars` early; the resulting hole is filled by a transition.
    Crossfade { bars: f64 },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RepeatContract {
    pub cycle_bars: f64,
    pub loop_step_ids: Vec<String>,
    #[serde(default)]
    pub mode: RepeatMode,
    #[serde(default)]
    pub remainder_policy: RemainderPolicy,
    #[serde(default)]
    pub joiner_step_id: Option<String>,
    #[serde(default)]
    pub boundary_transition: BoundaryTransition,
}

impl RepeatContract {
    /// Shape checks that need no template context.
    pub fn validate(&self) -> ChoreoResult<()> {
        if !self.cycle_bars.is_finite() || self.cycle_bars <= 0.0 {
            return Err(ChoreoError::validation(format!(
                "cycle_bars must be finite and > 0, got {}",
                self.cycle_bars
            )));
        }
        if self.loop_step_ids.is_empty() {
            return Err(ChoreoError::validation("loop_step_ids must be non-empty"));
        }
        match (self.mode, &self.joiner_step_id) {
            (RepeatMode::Joiner, None) => {
                return Err(ChoreoError::validation(
                    "joiner_step_id is required when mode is JOINER",
                ));
            }
            (RepeatMode::PingPong, Some(id)) => {
                return Err(ChoreoError::validation(format!(
                    "joiner_step_id '{id}' is only allowed when mode is JOINER"
                )));
            }
            _ => {}
        }
        if let BoundaryTransition::Crossfade { bars } = self.boundary_transition
            && (!bars.is_finite() || bars < 0.0)
        {
            return Err(ChoreoError::validation(
                "crossfade bars must be finite and >= 0",
            ));
        }
        Ok(())
    }

    /// Every step id this contract names.
    pub fn referenced_step_ids(&self) -> impl Iterator<Item = &str> {
        self.loop_step_ids
            .iter()
            .chain(self.joiner_step_id.iter())
            .map(String::as_str)
    }
}

/// One concrete placement of a loop step. `cycle_number` is 0-based.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScheduledInstance {
    pub step_id: String,
    pub start_bars: f64,
    pub end_bars: f64,
    pub cycle_number: usize,
    /// Belongs to the remainder cycle; clip at the window end.
    pub is_partial: bool,
    pub is_fade_out: bool,
    /// Stretched repeat of the final step that freezes on its last pose.
    #[serde(default)]
    pub is_hold: bool,
}

impl ScheduledInstance {
    pub fn duration_bars(&self) -> f64 {
        self.end_bars - self.start_bars
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RepeatSchedule {
    pub instances: Vec<ScheduledInstance>,
    pub num_complete_cycles: usize,
    pub remainder_bars: f64,
    pub remainder_policy: RemainderPolicy,
}

/// Per-step durations rescaled so one cycle spans exactly `cycle_bars`.
fn cycle_layout(
    contract: &RepeatContract,
    step_durations: Option<&[f64]>,
) -> ChoreoResult<Vec<f64>> {
    let n = contract.loop_step_ids.len();
    let Some(durations) = step_durations else {
        return Ok(vec![contract.cycle_bars / n as f64; n]);
    };
    if durations.len() != n {
        return Err(ChoreoError::invalid_argument(format!(
            "expected {n} step durations, got {}",
            durations.len()
        )));
    }
    if durations.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return Err(ChoreoError::invalid_argument(
            "step durations must be finite and > 0",
        ));
    }
    let total: f64 = durations.iter().sum();
    Ok(durations
        .iter()
        .map(|d| d * contract.cycle_bars / total)
        .collect())
}

/// Step order for a cycle: reversed on odd cycles under ping-pong.
fn cycle_order(contract: &RepeatContract, cycle: usize) -> Vec<usize> {
    let n = contract.loop_step_ids.len();
    if contract.mode == RepeatMode::PingPong && cycle % 2 == 1 {
        (0..n).rev().collect()
    } else {
        (0..n).collect()
    }
}

/// Instances for one cycle starting at `cycle_start`.
pub(crate) fn cycle_instances(
    contract: &RepeatContract,
    layout: &[f64],
    cycle: usize,
    cycle_start: f64,
) -> Vec<ScheduledInstance> {
    let mut at = cycle_start;
    cycle_order(contract, cycle)
        .into_iter()
        .map(|i| {
            let start = at;
            at += layout[i];
            ScheduledInstance {
                step_id: contract.loop_step_ids[i].clone(),
                start_bars: start,
                end_bars: at,
                cycle_number: cycle,
                is_partial: false,
                is_fade_out: false,
                is_hold: false,
            }
        })
        .collect()
}

/// Expand `contract` across a window of `duration_bars`.
///
/// Windows shorter than one cycle (including empty or negative ones) yield no instances and
/// report the whole window as remainder. Under `TRUNCATE` and `FADE_OUT` the remainder cycle
/// is scheduled in full order, but steps starting at or past the window end are omitted;
/// the caller clips the last kept step at the window boundary.
#[tracing::instrument(skip(contract, step_durations), fields(cycle_bars = contract.cycle_bars))]
pub fn schedule_repeats(
    contract: &RepeatContract,
    duration_bars: f64,
    step_durations: Option<&[f64]>,
) -> ChoreoResult<RepeatSchedule> {
    contract.validate()?;
    if !duration_bars.is_finite() {
        return Err(ChoreoError::invalid_argument(
            "duration_bars must be finite",
        ));
    }
    let layout = cycle_layout(contract, step_durations)?;

    if duration_bars + BAR_EPSILON < contract.cycle_bars {
        tracing::debug!(duration_bars, "window shorter than one cycle");
        return Ok(RepeatSchedule {
            instances: Vec::new(),
            num_complete_cycles: 0,
            remainder_bars: duration_bars,
            remainder_policy: contract.remainder_policy,
        });
    }

    let mut cycles = (duration_bars / contract.cycle_bars).floor() as usize;
    // Absorb float error just below a whole cycle count.
    if (cycles + 1) as f64 * contract.cycle_bars <= duration_bars + BAR_EPSILON {
        cycles += 1;
    }
    let mut remainder = duration_bars - cycles as f64 * contract.cycle_bars;
    if remainder < BAR_EPSILON {
        remainder = 0.0;
    }

    let mut instances = Vec::with_capacity((cycles + 1) * layout.len());
    for c in 0..cycles {
        instances.extend(cycle_instances(
            contract,
            &layout,
            c,
            c as f64 * contract.cycle_bars,
        ));
    }

    if remainder > 0.0 {
        let rem_start = cycles as f64 * contract.cycle_bars;
        match contract.remainder_policy {
            RemainderPolicy::HoldLastPose => {
                if let Some(last) = instances.last() {
                    instances.push(ScheduledInstance {
                        step_id: last.step_id.clone(),
                        start_bars: rem_start,
                        end_bars: duration_bars,
                        cycle_number: cycles,
                        is_partial: false,
                        is_fade_out: false,
                        is_hold: true,
                    });
                }
            }
            RemainderPolicy::Truncate | RemainderPolicy::FadeOut => {
                let fade = contract.remainder_policy == RemainderPolicy::FadeOut;
                // Instances starting at or past the window end would be clipped to nothing.
                instances.extend(
                    cycle_instances(contract, &layout, cycles, rem_start)
                        .into_iter()
                        .filter(|inst| inst.start_bars < duration_bars - BAR_EPSILON)
                        .map(|mut inst| {
                            inst.is_partial = true;
                            inst.is_fade_out = fade;
                            inst
                        }),
                );
            }
        }
    }

    tracing::debug!(
        cycles,
        remainder,
        instances = instances.len(),
        "repeat schedule built"
    );
    Ok(RepeatSchedule {
        instances,
        num_complete_cycles: cycles,
        remainder_bars: remainder,
        remainder_policy: contract.remainder_policy,
    })
}

/// First cycle clipped to a window shorter than one cycle, marked per the remainder policy.
///
/// [`schedule_repeats`] reports such windows as pure remainder; section rendering uses this
/// so short sections still play the start of the loop.
pub(crate) fn partial_first_cycle(
    contract: &RepeatContract,
    duration_bars: f64,
    step_durations: Option<&[f64]>,
) -> ChoreoResult<Vec<ScheduledInstance>> {
    contract.validate()?;
    if !duration_bars.is_finite() || duration_bars <= BAR_EPSILON {
        return Ok(Vec::new());
    }
    let layout = cycle_layout(contract, step_durations)?;
    let fade = contract.remainder_policy == RemainderPolicy::FadeOut;
    Ok(cycle_instances(contract, &layout, 0, 0.0)
        .into_iter()
        .filter(|inst| inst.start_bars < duration_bars - BAR_EPSILON)
        .map(|mut inst| {
            inst.is_partial = true;
            inst.is_fade_out = fade;
            inst
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/repeat.rs"]
mod tests;
