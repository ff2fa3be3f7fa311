use std::fmt::Write as _;

use crate::{
    compile::segment::ChannelValue,
    curve::model::Curve,
    fixture::config::FixtureConfig,
    timeline::model::TimelineEffect,
};

const DMX_FULL_SCALE: f64 = 255.0;

/// Encode a DMX-unit curve as an xLights custom value curve.
///
/// Times are written with 4 decimals, values normalized to `[0, 1]` on a 255 scale with 2.
pub fn encode_value_curve(channel: u16, curve: &Curve, reverse: bool) -> String {
    let mut values = String::with_capacity(curve.len() * 12);
    for (i, p) in curve.points().iter().enumerate() {
        if i > 0 {
            values.push(';');
        }
        let v = (p.v / DMX_FULL_SCALE).clamp(0.0, 1.0);
        // Writing into a String cannot fail.
        let _ = write!(values, "{:.4}:{:.2}", p.t, v);
    }
    format!(
        "Active=TRUE|Id=ID_VALUECURVE_DMX{channel}|Type=Custom|Min=0.00|Max=255.00|RV={}|Values={values}|",
        if reverse { "TRUE" } else { "FALSE" }
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementChannel {
    Pan,
    Tilt,
    Dimmer,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PlacementValue {
    Static { dmx: u8 },
    ValueCurve { encoded: String },
}

/// One DMX channel's contribution to one effect, ready for the exporter.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EffectPlacement {
    pub fixture_id: String,
    pub channel: PlacementChannel,
    /// 1-based DMX channel number.
    pub dmx_channel: u16,
    pub start_ms: u64,
    pub end_ms: u64,
    pub value: PlacementValue,
}

/// Split `effect` into pan, tilt and dimmer placements on `fixture`'s channels.
///
/// Curves are already in fixture DMX space (inversion applied), so they are never reversed.
pub fn effect_placements(
    effect: &TimelineEffect,
    fixture: &FixtureConfig,
) -> Vec<EffectPlacement> {
    let ch = fixture.channels;
    [
        (PlacementChannel::Pan, ch.pan, &effect.channels.pan),
        (PlacementChannel::Tilt, ch.tilt, &effect.channels.tilt),
        (PlacementChannel::Dimmer, ch.dimmer, &effect.channels.dimmer),
    ]
    .into_iter()
    .map(|(channel, dmx_channel, value)| EffectPlacement {
        fixture_id: effect.fixture_id.clone(),
        channel,
        dmx_channel,
        start_ms: effect.start_ms,
        end_ms: effect.end_ms,
        value: match value {
            ChannelValue::Static(dmx) => PlacementValue::Static { dmx: *dmx },
            ChannelValue::Curve(curve) => PlacementValue::ValueCurve {
                encoded: encode_value_curve(dmx_channel, curve, false),
            },
        },
    })
    .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/export/value_curve.rs"]
mod tests;
