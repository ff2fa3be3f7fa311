use std::collections::BTreeMap;

use crate::{
    animation::ease::Ease,
    compile::segment::{ChannelValue, SegmentChannels},
    curve::ops::sample,
    fixture::boundary::{Axis, BoundaryEnforcer},
    foundation::{
        core::PanTilt,
        diagnostics::Diagnostics,
        error::{ChoreoError, ChoreoResult},
        math::lerp,
    },
    timeline::model::{EffectOrigin, TimelineEffect, TimelineGap, sort_effects},
};

/// Strategy every gap currently resolves to.
pub const GAP_FILL: &str = "gap_fill";

/// Spans shorter than this are filled edge to edge.
const MICRO_GAP_MS: f64 = 10.0;
/// Centering pads smaller than this are absorbed into the fill.
const MIN_PADDING_MS: f64 = 5.0;

/// Fit a fill of `desired_ms` into `[gap_start, gap_end]`, in whole milliseconds.
///
/// Tiny spans and near-full fills cover the whole gap; otherwise the fill is centred.
pub fn snap_timing(gap_start: f64, gap_end: f64, desired_ms: f64) -> (u64, u64) {
    let start = gap_start.round().max(0.0);
    let end = gap_end.round().max(start);
    let available = end - start;
    if available < MICRO_GAP_MS {
        return (start as u64, end as u64);
    }
    let duration = if desired_ms.is_finite() {
        desired_ms.clamp(0.0, available)
    } else {
        available
    };
    let padding = (available - duration) / 2.0;
    if padding < MIN_PADDING_MS {
        return (start as u64, end as u64);
    }
    let fill_start = start + padding.round();
    (fill_start as u64, (fill_start + duration.round()) as u64)
}

/// Per-fixture inputs a renderer needs besides the gap itself.
#[derive(Clone, Debug)]
pub struct FillContext<'a> {
    pub boundary: &'a BoundaryEnforcer,
    /// Pose used when a gap has no anchor at all.
    pub rest_pose: PanTilt,
    pub dimmer_dmx: u8,
    pub ease: Ease,
    pub samples: usize,
}

pub trait TransitionRenderer: Send + Sync {
    fn strategy(&self) -> &str;

    fn render(
        &self,
        gap: &TimelineGap,
        start_ms: u64,
        end_ms: u64,
        ctx: &FillContext<'_>,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<Vec<TimelineEffect>>;
}

/// Eased pan/tilt move between the gap's anchors with a fixed dimmer level.
#[derive(Clone, Copy, Debug, Default)]
pub struct GapFillRenderer;

impl GapFillRenderer {
    fn channel(
        &self,
        axis: Axis,
        from: f64,
        to: f64,
        ctx: &FillContext<'_>,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<ChannelValue> {
        if from == to {
            return Ok(ChannelValue::Static(ctx.boundary.to_dmx(axis, from, diags)));
        }
        let degrees = sample(|t| lerp(from, to, ctx.ease.apply(t)), ctx.samples)?;
        Ok(ChannelValue::from_curve(
            ctx.boundary.curve_to_dmx(axis, &degrees, diags),
        ))
    }
}

impl TransitionRenderer for GapFillRenderer {
    fn strategy(&self) -> &str {
        GAP_FILL
    }

    fn render(
        &self,
        gap: &TimelineGap,
        start_ms: u64,
        end_ms: u64,
        ctx: &FillContext<'_>,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<Vec<TimelineEffect>> {
        if end_ms <= start_ms {
            return Ok(Vec::new());
        }
        // A missing anchor holds the other one; with neither, rest.
        let (from, to) = match (gap.from_position, gap.to_position) {
            (Some(a), Some(b)) => (a, b),
            (Some(a), None) => (a, a),
            (None, Some(b)) => (b, b),
            (None, None) => (ctx.rest_pose, ctx.rest_pose),
        };
        let channels = SegmentChannels {
            pan: self.channel(Axis::Pan, from.pan_deg, to.pan_deg, ctx, diags)?,
            tilt: self.channel(Axis::Tilt, from.tilt_deg, to.tilt_deg, ctx, diags)?,
            dimmer: ChannelValue::Static(ctx.dimmer_dmx),
        };
        Ok(vec![TimelineEffect {
            fixture_id: ctx.boundary.fixture_id().to_string(),
            start_ms,
            end_ms,
            start_pose: from,
            end_pose: to,
            origin: EffectOrigin::Transition {
                strategy: self.strategy().to_string(),
                gap_type: gap.gap_type,
            },
            channels,
            metadata: BTreeMap::new(),
        }])
    }
}

/// Fill strategies keyed by name.
#[derive(Default)]
pub struct TransitionRegistry {
    renderers: BTreeMap<String, Box<dyn TransitionRenderer>>,
}

impl std::fmt::Debug for TransitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionRegistry")
            .field("renderers", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TransitionRegistry {
    pub fn with_builtins() -> Self {
        let mut reg = Self::default();
        reg.register(Box::new(GapFillRenderer));
        reg
    }

    /// Add or replace a strategy.
    pub fn register(&mut self, renderer: Box<dyn TransitionRenderer>) {
        self.renderers.insert(renderer.strategy().to_string(), renderer);
    }

    pub fn get(&self, strategy: &str) -> ChoreoResult<&dyn TransitionRenderer> {
        self.renderers
            .get(strategy)
            .map(|r| r.as_ref())
            .ok_or_else(|| {
                ChoreoError::unknown("transition", strategy, self.renderers.keys().cloned())
            })
    }

    /// Strategy for a gap. Every gap type uses [`GAP_FILL`] today.
    pub fn strategy_for(&self, _gap: &TimelineGap) -> &'static str {
        GAP_FILL
    }
}

/// Fills gaps and merges the fills into the effect list.
#[derive(Clone, Copy, Debug)]
pub struct TransitionProcessor<'a> {
    registry: &'a TransitionRegistry,
    /// Cap on a single fill; `None` fills each gap completely.
    fill_max_ms: Option<f64>,
}

impl<'a> TransitionProcessor<'a> {
    pub fn new(registry: &'a TransitionRegistry, fill_max_ms: Option<f64>) -> Self {
        Self {
            registry,
            fill_max_ms,
        }
    }

    /// Render a fill for every gap and return `effects` plus fills, sorted.
    ///
    /// Gaps without a `fixture_id` are filled for every fixture in `contexts`; gaps naming an
    /// unknown fixture are an error.
    #[tracing::instrument(skip_all, fields(effects = effects.len(), gaps = gaps.len()))]
    pub fn process(
        &self,
        mut effects: Vec<TimelineEffect>,
        gaps: &[TimelineGap],
        contexts: &BTreeMap<String, FillContext<'_>>,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<Vec<TimelineEffect>> {
        for gap in gaps {
            let renderer = self.registry.get(self.registry.strategy_for(gap))?;
            let desired = self.fill_max_ms.unwrap_or(gap.duration_ms() as f64);
            let (start, end) = snap_timing(gap.start_ms as f64, gap.end_ms as f64, desired);
            let targets: Vec<&FillContext<'_>> = match &gap.fixture_id {
                Some(id) => vec![contexts.get(id).ok_or_else(|| {
                    ChoreoError::unknown("fixture", id.clone(), contexts.keys().cloned())
                })?],
                None => contexts.values().collect(),
            };
            for ctx in targets {
                let fills = renderer.render(gap, start, end, ctx, diags)?;
                tracing::debug!(
                    fixture = %ctx.boundary.fixture_id(),
                    start,
                    end,
                    gap_type = ?gap.gap_type,
                    "gap filled"
                );
                effects.extend(fills);
            }
        }
        sort_effects(&mut effects);
        Ok(effects)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/transitions.rs"]
mod tests;
