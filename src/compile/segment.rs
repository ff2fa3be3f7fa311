use std::collections::BTreeMap;

use crate::{curve::model::Curve, foundation::error::ChoreoResult};

/// One DMX channel over a segment: a fixed byte or a curve in DMX units (`0..=255`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelValue {
    Static(u8),
    Curve(Curve),
}

fn to_byte(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

impl ChannelValue {
    /// Flat curves collapse to [`ChannelValue::Static`].
    pub fn from_curve(curve: Curve) -> Self {
        if curve.is_flat() {
            Self::Static(to_byte(curve.first().v))
        } else {
            Self::Curve(curve)
        }
    }

    pub fn as_curve(&self) -> Option<&Curve> {
        match self {
            Self::Static(_) => None,
            Self::Curve(c) => Some(c),
        }
    }

    pub fn value_at(&self, t: f64) -> f64 {
        match self {
            Self::Static(v) => f64::from(*v),
            Self::Curve(c) => c.value_at(t),
        }
    }

    pub fn start_value(&self) -> f64 {
        self.value_at(0.0)
    }

    pub fn end_value(&self) -> f64 {
        self.value_at(1.0)
    }

    /// Hold the value the channel ends on.
    pub fn frozen_at_end(&self) -> Self {
        Self::Static(to_byte(self.end_value()))
    }

    /// Transform the curve form; static values pass through.
    pub fn try_map_curve<F>(&self, f: F) -> ChoreoResult<Self>
    where
        F: FnOnce(&Curve) -> ChoreoResult<Curve>,
    {
        match self {
            Self::Static(v) => Ok(Self::Static(*v)),
            Self::Curve(c) => Ok(Self::from_curve(f(c)?)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SegmentChannels {
    pub pan: ChannelValue,
    pub tilt: ChannelValue,
    pub dimmer: ChannelValue,
}

impl SegmentChannels {
    pub fn try_map<F>(&self, mut f: F) -> ChoreoResult<Self>
    where
        F: FnMut(&ChannelValue) -> ChoreoResult<ChannelValue>,
    {
        Ok(Self {
            pan: f(&self.pan)?,
            tilt: f(&self.tilt)?,
            dimmer: f(&self.dimmer)?,
        })
    }

    pub fn frozen_at_end(&self) -> Self {
        Self {
            pan: self.pan.frozen_at_end(),
            tilt: self.tilt.frozen_at_end(),
            dimmer: self.dimmer.frozen_at_end(),
        }
    }
}

/// One fixture's compiled output for one step instance.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FixtureSegment {
    pub section_id: String,
    pub step_id: String,
    pub fixture_id: String,
    pub t0_ms: u64,
    pub t1_ms: u64,
    pub channels: SegmentChannels,
    /// Handler ids and resolved parameters, for tracing a segment back to its inputs.
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl FixtureSegment {
    pub fn duration_ms(&self) -> u64 {
        self.t1_ms.saturating_sub(self.t0_ms)
    }
}
