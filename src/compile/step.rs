use std::collections::BTreeMap;

use serde_json::json;

use crate::{
    compile::{
        segment::{ChannelValue, FixtureSegment, SegmentChannels},
        template::TemplateStep,
    },
    curve::{
        factory::CurveFactory,
        model::Curve,
        ops::{apply_phase_shift_samples, map_values},
    },
    fixture::{
        boundary::{Axis, BoundaryEnforcer},
        config::FixtureConfig,
        pose::PoseResolver,
    },
    foundation::{
        diagnostics::Diagnostics,
        error::{ChoreoError, ChoreoResult},
        math::dmx_from_unit,
    },
    handlers::{
        movement::OFFSET_FULL_SCALE_DEG,
        registry::{GeometryCalibration, HandlerRegistry, MovementCurves, MovementParams},
    },
};

/// Where and for whom a step is being compiled.
#[derive(Clone, Copy, Debug)]
pub struct StepTarget<'a> {
    pub section_id: &'a str,
    pub fixture: &'a FixtureConfig,
    /// Pose table bound to this fixture's travel.
    pub poses: &'a PoseResolver,
    pub fixture_index: usize,
    pub fixture_count: usize,
    pub t0_ms: u64,
    pub t1_ms: u64,
}

/// Runs geometry, movement and dimmer handlers for one step and one fixture.
#[derive(Clone, Copy, Debug)]
pub struct StepCompiler<'a> {
    handlers: &'a HandlerRegistry,
    factory: &'a CurveFactory,
}

impl<'a> StepCompiler<'a> {
    pub fn new(handlers: &'a HandlerRegistry, factory: &'a CurveFactory) -> Self {
        Self { handlers, factory }
    }

    pub fn compile(
        &self,
        step: &TemplateStep,
        target: &StepTarget<'_>,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<FixtureSegment> {
        if target.t1_ms <= target.t0_ms {
            return Err(ChoreoError::invalid_argument(format!(
                "step '{}' window is empty: [{}, {}] ms",
                step.step_id, target.t0_ms, target.t1_ms
            )));
        }
        let fixture = target.fixture;

        let calibration = GeometryCalibration {
            poses: target.poses,
            fixture_index: target.fixture_index,
            fixture_count: target.fixture_count,
        };
        let base = self.handlers.geometry(&step.geometry.id)?.resolve(
            &fixture.fixture_id,
            fixture.role.as_deref(),
            &step.geometry.params,
            &calibration,
            diags,
        )?;

        let n = self
            .factory
            .samples_for(step.movement.cycles.max(step.dimmer.cycles));
        let params = MovementParams {
            pattern_id: step.movement.id.clone(),
            amplitude_degrees: step.movement.amplitude_degrees,
            base_pose: base,
            extra: step.movement.params.clone(),
        };
        let MovementCurves { pan, tilt } = self.handlers.movement(&step.movement.id)?.generate(
            &params,
            n,
            step.movement.cycles,
            step.intensity,
            diags,
        )?;
        let dimmer = self.handlers.dimmer(&step.dimmer.id)?.generate(
            &step.dimmer.params,
            n,
            step.dimmer.cycles,
            step.intensity,
            step.dimmer.min_norm,
            step.dimmer.max_norm,
        )?;

        let phase = step
            .phase
            .offset_for(target.fixture_index, target.fixture_count);
        let (pan, tilt, dimmer) = if phase != 0.0 {
            let shift = |c: &Curve| apply_phase_shift_samples(c.points(), phase, n, step.phase_wrap);
            (shift(&pan)?, shift(&tilt)?, shift(&dimmer)?)
        } else {
            (pan, tilt, dimmer)
        };

        let base_deg = target.poses.from_norm(base);
        let pan_deg = map_values(&pan, |v| base_deg.pan_deg + (v - 0.5) * OFFSET_FULL_SCALE_DEG);
        let tilt_deg = map_values(&tilt, |v| {
            base_deg.tilt_deg + (v - 0.5) * OFFSET_FULL_SCALE_DEG
        });
        let boundary = BoundaryEnforcer::new(fixture);
        let channels = SegmentChannels {
            pan: ChannelValue::from_curve(boundary.curve_to_dmx(Axis::Pan, &pan_deg, diags)),
            tilt: ChannelValue::from_curve(boundary.curve_to_dmx(Axis::Tilt, &tilt_deg, diags)),
            dimmer: ChannelValue::from_curve(map_values(&dimmer, |v| f64::from(dmx_from_unit(v)))),
        };

        let metadata: BTreeMap<String, serde_json::Value> = [
            ("geometry_id", json!(step.geometry.id)),
            ("movement_id", json!(step.movement.id)),
            ("dimmer_id", json!(step.dimmer.id)),
            ("intensity", json!(step.intensity)),
            ("samples", json!(n)),
            ("phase_offset", json!(phase)),
            ("base_pan_deg", json!(base_deg.pan_deg)),
            ("base_tilt_deg", json!(base_deg.tilt_deg)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        tracing::trace!(
            fixture = %fixture.fixture_id,
            step = %step.step_id,
            samples = n,
            "step compiled"
        );
        Ok(FixtureSegment {
            section_id: target.section_id.to_string(),
            step_id: step.step_id.clone(),
            fixture_id: fixture.fixture_id.clone(),
            t0_ms: target.t0_ms,
            t1_ms: target.t1_ms,
            channels,
            metadata,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/step.rs"]
mod tests;
