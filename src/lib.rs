//! Choreo compiles moving-light choreography into per-fixture DMX timelines.
//!
//! Templates describe steps (a geometry, a movement pattern and a dimmer pattern) and an
//! optional repeat contract. A [`ShowPlan`] places templates over bar windows of a song;
//! [`Choreographer::render_show`] turns it into a gap-free, deterministic list of
//! [`TimelineEffect`]s:
//!
//! - Compile each step per fixture into pan/tilt/dimmer DMX curves ([`StepCompiler`])
//! - Expand repeat contracts across section windows ([`schedule_repeats`])
//! - Detect uncovered intervals per fixture ([`GapDetector`]) and fill them
//!   ([`TransitionProcessor`])
//! - Serialize curves for xLights ([`encode_value_curve`], [`effect_placements`])
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod compile;
pub(crate) mod curve;
pub(crate) mod export;
pub(crate) mod fixture;
pub(crate) mod handlers;
pub(crate) mod schedule;
pub(crate) mod timeline;

pub use crate::foundation::config::CompileConfig;
pub use crate::foundation::core::{BeatGrid, NormPose, PanTilt};
pub use crate::foundation::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use crate::foundation::error::{ChoreoError, ChoreoResult};

pub use crate::animation::ease::Ease;

pub use crate::curve::factory::{CurveFactory, CurveKind, WaveShape};
pub use crate::curve::model::{Curve, CurvePoint, interpolate};
pub use crate::curve::ops::{
    apply_phase_shift_samples, clamp as clamp_curve, crop, invert, map_values, multiply,
    resample_to_grid, sample, scale_to_range, time_shift,
};
pub use crate::curve::simplify::{DistanceScale, simplify_near_collinear, simplify_rdp};

pub use crate::fixture::boundary::{Axis, BoundaryEnforcer};
pub use crate::fixture::config::{
    DmxChannelMap, FixtureConfig, FixtureGroup, MovementLimits, Orientation, PanTiltRange,
};
pub use crate::fixture::pose::{
    DEFAULT_PAN_POSE, DEFAULT_TILT_POSE, PoseResolver, STANDARD_POSES,
};

pub use crate::handlers::dimmer::{FadeDimmer, HoldDimmer, PulseDimmer};
pub use crate::handlers::geometry::{FanGeometry, RolePoseGeometry};
pub use crate::handlers::movement::{
    CategoricalParams, DefaultMovementHandler, MovementLibrary, MovementPattern,
    OFFSET_FULL_SCALE_DEG, rescale_offset,
};
pub use crate::handlers::registry::{
    DimmerHandler, GeometryCalibration, GeometryHandler, HandlerRegistry, Intensity,
    MovementCurves, MovementHandler, MovementParams,
};

pub use crate::compile::fingerprint::{TimelineFingerprint, fingerprint_effects};
pub use crate::compile::plan::{NamedPose, SectionPlan, ShowPlan};
pub use crate::compile::segment::{ChannelValue, FixtureSegment, SegmentChannels};
pub use crate::compile::step::{StepCompiler, StepTarget};
pub use crate::compile::template::{
    DimmerSpec, MovementSpec, PatternRef, PhaseOffset, Template, TemplateStep,
};

pub use crate::schedule::repeat::{
    BoundaryTransition, RemainderPolicy, RepeatContract, RepeatMode, RepeatSchedule,
    ScheduledInstance, schedule_repeats,
};

pub use crate::timeline::assemble::{Choreographer, RenderedShow, ShowContext};
pub use crate::timeline::gaps::GapDetector;
pub use crate::timeline::model::{
    EffectOrigin, GapType, TimelineEffect, TimelineEntry, TimelineGap, sort_effects,
};
pub use crate::timeline::transitions::{
    FillContext, GAP_FILL, GapFillRenderer, TransitionProcessor, TransitionRegistry,
    TransitionRenderer, snap_timing,
};

pub use crate::export::value_curve::{
    EffectPlacement, PlacementChannel, PlacementValue, effect_placements, encode_value_curve,
};
