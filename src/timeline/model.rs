use std::collections::BTreeMap;

use crate::{
    compile::segment::{FixtureSegment, SegmentChannels},
    foundation::core::PanTilt,
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapType {
    Start,
    MidSequence,
    InterSection,
    End,
}

/// What produced an effect.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EffectOrigin {
    Step { section_id: String, step_id: String },
    Transition { strategy: String, gap_type: GapType },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineEffect {
    pub fixture_id: String,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Pose at `start_ms`, degrees.
    pub start_pose: PanTilt,
    pub end_pose: PanTilt,
    pub origin: EffectOrigin,
    pub channels: SegmentChannels,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl TimelineEffect {
    /// Wrap a compiled segment; poses are the segment's first and last angles.
    pub fn from_segment(segment: FixtureSegment, start_pose: PanTilt, end_pose: PanTilt) -> Self {
        Self {
            fixture_id: segment.fixture_id,
            start_ms: segment.t0_ms,
            end_ms: segment.t1_ms,
            start_pose,
            end_pose,
            origin: EffectOrigin::Step {
                section_id: segment.section_id,
                step_id: segment.step_id,
            },
            channels: segment.channels,
            metadata: segment.metadata,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn is_transition(&self) -> bool {
        matches!(self.origin, EffectOrigin::Transition { .. })
    }
}

/// Uncovered interval with the poses on either side of it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineGap {
    pub start_ms: u64,
    pub end_ms: u64,
    pub gap_type: GapType,
    #[serde(default)]
    pub fixture_id: Option<String>,
    #[serde(default)]
    pub from_position: Option<PanTilt>,
    #[serde(default)]
    pub to_position: Option<PanTilt>,
}

impl TimelineGap {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn overlaps(&self, start_ms: u64, end_ms: u64) -> bool {
        self.start_ms < end_ms && start_ms < self.end_ms
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "entry")]
pub enum TimelineEntry {
    Effect(TimelineEffect),
    Gap(TimelineGap),
}

impl TimelineEntry {
    pub fn start_ms(&self) -> u64 {
        match self {
            Self::Effect(e) => e.start_ms,
            Self::Gap(g) => g.start_ms,
        }
    }
}

/// Order used for every emitted effect list: `(start_ms, fixture_id, end_ms)`.
pub fn sort_effects(effects: &mut [TimelineEffect]) {
    effects.sort_by(|a, b| {
        a.start_ms
            .cmp(&b.start_ms)
            .then_with(|| a.fixture_id.cmp(&b.fixture_id))
            .then_with(|| a.end_ms.cmp(&b.end_ms))
    });
}
