use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::{
    compile::{
        fingerprint::{TimelineFingerprint, fingerprint_effects},
        plan::{SectionPlan, ShowPlan},
        segment::{ChannelValue, FixtureSegment, SegmentChannels},
        step::{StepCompiler, StepTarget},
        template::{Template, TemplateStep},
    },
    curve::{
        factory::CurveFactory,
        model::{Curve, CurvePoint},
        ops::{crop, multiply},
        simplify::{DistanceScale, simplify_rdp},
    },
    fixture::{
        boundary::BoundaryEnforcer,
        config::{FixtureConfig, FixtureGroup, PanTiltRange},
        pose::PoseResolver,
    },
    foundation::{
        config::CompileConfig,
        core::BeatGrid,
        diagnostics::Diagnostics,
        error::{ChoreoError, ChoreoResult},
    },
    handlers::registry::HandlerRegistry,
    schedule::repeat::{BoundaryTransition, partial_first_cycle, schedule_repeats},
    timeline::{
        gaps::GapDetector,
        model::{TimelineEffect, TimelineEntry, TimelineGap, sort_effects},
        transitions::{FillContext, TransitionProcessor, TransitionRegistry},
    },
};

/// Show-wide inputs shared by every section.
#[derive(Clone, Debug)]
pub struct ShowContext<'a> {
    beat_grid: BeatGrid,
    fixtures: &'a FixtureGroup,
    /// Pose tables bound to each fixture's travel, in group order.
    poses: Vec<PoseResolver>,
}

impl<'a> ShowContext<'a> {
    pub fn new(beat_grid: BeatGrid, fixtures: &'a FixtureGroup, poses: &PoseResolver) -> Self {
        Self {
            beat_grid,
            fixtures,
            poses: fixtures
                .fixtures
                .iter()
                .map(|f| poses.for_range(f.range))
                .collect(),
        }
    }

    pub fn beat_grid(&self) -> BeatGrid {
        self.beat_grid
    }

    pub fn fixtures(&self) -> &FixtureGroup {
        self.fixtures
    }
}

/// Effects and diagnostics of one fixture within a section.
type FixtureOutput = ChoreoResult<(Vec<TimelineEffect>, Diagnostics)>;

/// One step instance laid out within a section, in bars relative to the section start.
#[derive(Clone, Debug)]
struct Placement<'t> {
    step: &'t TemplateStep,
    start_bars: f64,
    /// Where the step would end if nothing clipped it.
    natural_end_bars: f64,
    end_bars: f64,
    hold: bool,
    /// Dimmer envelope levels at the instance's start and end.
    fade: Option<(f64, f64)>,
}

/// Rendered show: effects and fills in `(start_ms, fixture_id, end_ms)` order.
#[derive(Clone, Debug, serde::Serialize)]
pub struct RenderedShow {
    pub song_duration_ms: u64,
    pub effects: Vec<TimelineEffect>,
    /// Gaps that were detected (and filled) before the final merge.
    pub gaps: Vec<TimelineGap>,
    pub diagnostics: Diagnostics,
    pub fingerprint: TimelineFingerprint,
}

/// Compile context: configuration, curve factory and handler registries.
///
/// Built once and shared read-only by every compile worker.
#[derive(Debug)]
pub struct Choreographer {
    config: CompileConfig,
    factory: CurveFactory,
    handlers: HandlerRegistry,
    transitions: TransitionRegistry,
    pool: Option<rayon::ThreadPool>,
}

impl Choreographer {
    pub fn new(config: CompileConfig) -> ChoreoResult<Self> {
        config.validate()?;
        let factory = config.curve_factory()?;
        let handlers = HandlerRegistry::with_builtins(&factory)?;
        let pool = match (config.parallel(), config.threads()) {
            (true, Some(n)) => Some(build_thread_pool(n)?),
            _ => None,
        };
        Ok(Self {
            config,
            factory,
            handlers,
            transitions: TransitionRegistry::with_builtins(),
            pool,
        })
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    pub fn factory(&self) -> &CurveFactory {
        &self.factory
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Register custom pattern handlers before rendering.
    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    pub fn transitions_mut(&mut self) -> &mut TransitionRegistry {
        &mut self.transitions
    }

    /// Render every section of `plan`, then detect and fill gaps per fixture.
    #[tracing::instrument(skip(self, plan), fields(sections = plan.sections.len()))]
    pub fn render_show(&self, plan: &ShowPlan) -> ChoreoResult<RenderedShow> {
        plan.validate()?;
        let mut diags = Diagnostics::new();
        let poses = PoseResolver::with_sources(
            PanTiltRange::default(),
            &plan.pose_overrides,
            &plan.custom_pose_pairs(),
            &mut diags,
        )?;
        let ctx = ShowContext::new(plan.beat_grid, &plan.fixtures, &poses);

        let mut effects = Vec::new();
        for section in &plan.sections {
            let template = plan.template(&section.template_id)?;
            effects.extend(self.render_section(template, section, &ctx, &mut diags)?);
        }
        sort_effects(&mut effects);

        let entries: Vec<TimelineEntry> = effects.into_iter().map(TimelineEntry::Effect).collect();
        let detector = GapDetector::new(self.config.min_gap_ms());
        let mut gaps: Vec<TimelineGap> = plan
            .fixtures
            .fixtures
            .iter()
            .flat_map(|f| {
                detector.detect_fixture_gaps(&f.fixture_id, &entries, plan.song_duration_ms)
            })
            .collect();
        gaps.sort_by(|a, b| {
            a.start_ms
                .cmp(&b.start_ms)
                .then_with(|| a.fixture_id.cmp(&b.fixture_id))
        });
        let effects: Vec<TimelineEffect> = entries
            .into_iter()
            .filter_map(|e| match e {
                TimelineEntry::Effect(effect) => Some(effect),
                TimelineEntry::Gap(_) => None,
            })
            .collect();

        let boundaries: Vec<BoundaryEnforcer> = plan
            .fixtures
            .fixtures
            .iter()
            .map(BoundaryEnforcer::new)
            .collect();
        let mut contexts = BTreeMap::new();
        for (boundary, poses) in boundaries.iter().zip(&ctx.poses) {
            contexts.insert(
                boundary.fixture_id().to_string(),
                FillContext {
                    boundary,
                    rest_pose: poses.default_pose(&mut diags)?,
                    dimmer_dmx: self.config.fill_dimmer_dmx(),
                    ease: self.config.fill_ease(),
                    samples: self.factory.samples_for(1.0),
                },
            );
        }

        let processor = TransitionProcessor::new(&self.transitions, self.config.fill_max_ms());
        let effects = processor.process(effects, &gaps, &contexts, &mut diags)?;
        let fingerprint = fingerprint_effects(&effects);
        tracing::info!(
            effects = effects.len(),
            gaps = gaps.len(),
            diagnostics = diags.len(),
            %fingerprint,
            "show rendered"
        );
        Ok(RenderedShow {
            song_duration_ms: plan.song_duration_ms,
            effects,
            gaps,
            diagnostics: diags,
            fingerprint,
        })
    }

    /// Lay `template` over the section window and compile it for each participating fixture.
    #[tracing::instrument(skip(self, template, ctx, diags), fields(section = %section.section_id))]
    pub fn render_section(
        &self,
        template: &Template,
        section: &SectionPlan,
        ctx: &ShowContext<'_>,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<Vec<TimelineEffect>> {
        template.validate()?;
        if template.template_id != section.template_id {
            return Err(ChoreoError::invalid_argument(format!(
                "section '{}' expects template '{}', got '{}'",
                section.section_id, section.template_id, template.template_id
            )));
        }
        let placements = self.layout(template, section, diags)?;

        let participants: Vec<(usize, &FixtureConfig)> = match &section.fixtures {
            Some(ids) => ctx
                .fixtures
                .fixtures
                .iter()
                .enumerate()
                .filter(|(_, f)| ids.contains(&f.fixture_id))
                .collect(),
            None => ctx.fixtures.fixtures.iter().enumerate().collect(),
        };
        let count = participants.len();

        let compile_one = |(slot, &(group_idx, fixture)): (usize, &(usize, &FixtureConfig))| {
            let mut local = Diagnostics::new();
            let effects = self.compile_fixture(
                section,
                &placements,
                ctx,
                fixture,
                &ctx.poses[group_idx],
                (slot, count),
                &mut local,
            );
            effects.map(|e| (e, local))
        };

        let results: Vec<FixtureOutput> = if self.config.parallel() {
            let run = || {
                participants
                    .par_iter()
                    .enumerate()
                    .map(&compile_one)
                    .collect::<Vec<_>>()
            };
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        } else {
            participants
                .iter()
                .enumerate()
                .map(&compile_one)
                .collect::<Vec<_>>()
        };

        // Merge in group order so output does not depend on scheduling.
        let mut effects = Vec::new();
        for r in results {
            let (e, d) = r?;
            effects.extend(e);
            diags.extend(d);
        }
        sort_effects(&mut effects);
        tracing::debug!(effects = effects.len(), fixtures = count, "section rendered");
        Ok(effects)
    }

    fn layout<'t>(
        &self,
        template: &'t Template,
        section: &SectionPlan,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<Vec<Placement<'t>>> {
        let window = section.duration_bars();
        let mut placements = Vec::new();

        let Some(contract) = &template.repeat else {
            let mut at = 0.0;
            for step in &template.steps {
                if at >= window {
                    break;
                }
                let natural_end = at + step.duration_bars;
                placements.push(Placement {
                    step,
                    start_bars: at,
                    natural_end_bars: natural_end,
                    end_bars: natural_end.min(window),
                    hold: false,
                    fade: None,
                });
                at = natural_end;
            }
            return Ok(placements);
        };

        let durations = template.loop_durations()?;
        let schedule = schedule_repeats(contract, window, durations.as_deref())?;
        let (instances, fade_from) = if schedule.instances.is_empty() {
            (partial_first_cycle(contract, window, durations.as_deref())?, 0.0)
        } else {
            let complete = schedule.num_complete_cycles as f64 * contract.cycle_bars;
            (schedule.instances, complete)
        };

        let last = instances.len().saturating_sub(1);
        for (i, inst) in instances.iter().enumerate() {
            let (start_bars, end_bars) = (inst.start_bars, inst.end_bars);
            let step = template.step(&inst.step_id)?;
            let mut end = end_bars.min(window);
            if let BoundaryTransition::Crossfade { bars } = contract.boundary_transition
                && i < last
            {
                end -= bars;
            }
            if end <= start_bars {
                diags.fallback(
                    &section.section_id,
                    format!(
                        "instance of '{}' at bar {start_bars:.3} vanishes after clipping",
                        inst.step_id
                    ),
                );
                continue;
            }
            let fade = inst.is_fade_out.then(|| {
                let span = (window - fade_from).max(f64::EPSILON);
                let level = |bar: f64| (1.0 - (bar - fade_from) / span).clamp(0.0, 1.0);
                (level(start_bars), level(end))
            });
            placements.push(Placement {
                step,
                start_bars,
                natural_end_bars: end_bars,
                end_bars: end,
                hold: inst.is_hold,
                fade,
            });
        }
        Ok(placements)
    }

    #[allow(clippy::too_many_arguments)]
    fn compile_fixture(
        &self,
        section: &SectionPlan,
        placements: &[Placement<'_>],
        ctx: &ShowContext<'_>,
        fixture: &FixtureConfig,
        poses: &PoseResolver,
        (fixture_index, fixture_count): (usize, usize),
        diags: &mut Diagnostics,
    ) -> ChoreoResult<Vec<TimelineEffect>> {
        let compiler = StepCompiler::new(&self.handlers, &self.factory);
        let boundary = BoundaryEnforcer::new(fixture);
        let to_ms = |bars: f64| -> u64 {
            ctx.beat_grid
                .bars_to_ms(section.start_bar + bars)
                .round()
                .max(0.0) as u64
        };

        let mut effects = Vec::with_capacity(placements.len());
        for p in placements {
            let t0 = to_ms(p.start_bars);
            let t_natural = to_ms(p.natural_end_bars);
            let t1 = to_ms(p.end_bars);
            if t1 <= t0 {
                continue;
            }
            let target = StepTarget {
                section_id: &section.section_id,
                fixture,
                poses,
                fixture_index,
                fixture_count,
                t0_ms: t0,
                t1_ms: t_natural.max(t1),
            };
            let segment = compiler.compile(p.step, &target, diags)?;
            let segment = self.finish_segment(segment, p, t1)?;
            let start_pose = boundary.dmx_to_pose(
                segment.channels.pan.start_value(),
                segment.channels.tilt.start_value(),
            );
            let end_pose = boundary.dmx_to_pose(
                segment.channels.pan.end_value(),
                segment.channels.tilt.end_value(),
            );
            effects.push(TimelineEffect::from_segment(segment, start_pose, end_pose));
        }
        Ok(effects)
    }

    /// Clip, fade, freeze and simplify a compiled segment for its placement.
    fn finish_segment(
        &self,
        mut segment: FixtureSegment,
        p: &Placement<'_>,
        t1_ms: u64,
    ) -> ChoreoResult<FixtureSegment> {
        if p.hold {
            segment.channels = segment.channels.frozen_at_end();
            segment
                .metadata
                .insert("hold".to_string(), serde_json::Value::Bool(true));
            return Ok(segment);
        }

        let natural = p.natural_end_bars - p.start_bars;
        let keep = if natural > 0.0 {
            ((p.end_bars - p.start_bars) / natural).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if keep < 1.0 {
            segment.channels = segment
                .channels
                .try_map(|ch| ch.try_map_curve(|c| crop(c, 0.0, keep)))?;
            segment
                .metadata
                .insert("clipped_fraction".to_string(), serde_json::json!(keep));
        }
        segment.t1_ms = t1_ms;

        if let Some((from, to)) = p.fade {
            let envelope = [CurvePoint::new(0.0, from), CurvePoint::new(1.0, to)];
            let base = match &segment.channels.dimmer {
                ChannelValue::Static(v) => Curve::constant(f64::from(*v)),
                ChannelValue::Curve(c) => c.clone(),
            };
            segment.channels.dimmer = ChannelValue::from_curve(multiply(&base, &envelope));
            segment
                .metadata
                .insert("fade_out".to_string(), serde_json::Value::Bool(true));
        }

        let epsilon = self.config.simplify_epsilon();
        if epsilon > 0.0 {
            segment.channels = simplify_channels(&segment.channels, epsilon)?;
        }
        Ok(segment)
    }
}

fn simplify_channels(channels: &SegmentChannels, epsilon: f64) -> ChoreoResult<SegmentChannels> {
    channels.try_map(|ch| {
        ch.try_map_curve(|c| simplify_rdp(c, epsilon, DistanceScale::default()))
    })
}

fn build_thread_pool(threads: usize) -> ChoreoResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(ChoreoError::validation("threads must be >= 1 when set"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ChoreoError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/assemble.rs"]
mod tests;
