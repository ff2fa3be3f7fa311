use std::collections::BTreeMap;

use super::*;
use crate::{
    compile::segment::SegmentChannels,
    curve::model::CurvePoint,
    fixture::config::{DmxChannelMap, MovementLimits, Orientation, PanTiltRange},
    foundation::core::PanTilt,
    timeline::model::EffectOrigin,
};

fn fixture() -> FixtureConfig {
    FixtureConfig {
        fixture_id: "mh1".to_string(),
        channels: DmxChannelMap {
            pan: 11,
            tilt: 12,
            dimmer: 15,
        },
        range: PanTiltRange::default(),
        orientation: Orientation::default(),
        limits: MovementLimits::default(),
        role: None,
    }
}

#[test]
fn encodes_pipe_delimited_curve() {
    let curve = Curve::new(vec![
        CurvePoint::new(0.0, 0.0),
        CurvePoint::new(0.5, 127.5),
        CurvePoint::new(1.0, 255.0),
    ])
    .unwrap();
    assert_eq!(
        encode_value_curve(11, &curve, false),
        "Active=TRUE|Id=ID_VALUECURVE_DMX11|Type=Custom|Min=0.00|Max=255.00|RV=FALSE|\
         Values=0.0000:0.00;0.5000:0.50;1.0000:1.00|"
    );
}

#[test]
fn reverse_flag_and_rounding() {
    let curve = Curve::new(vec![CurvePoint::new(0.0, 64.0), CurvePoint::new(1.0 / 3.0, 300.0)])
        .unwrap();
    let s = encode_value_curve(3, &curve, true);
    assert!(s.contains("|RV=TRUE|"));
    // 64/255 = 0.2509..., out-of-scale values are clamped to 1.
    assert!(s.ends_with("|Values=0.0000:0.25;0.3333:1.00|"));
}

#[test]
fn placements_follow_channel_map() {
    let curve = Curve::from_grid_values(&[0.0, 255.0]).unwrap();
    let effect = TimelineEffect {
        fixture_id: "mh1".to_string(),
        start_ms: 1000,
        end_ms: 3000,
        start_pose: PanTilt::new(0.0, 0.0),
        end_pose: PanTilt::new(0.0, 0.0),
        origin: EffectOrigin::Step {
            section_id: "verse".to_string(),
            step_id: "a".to_string(),
        },
        channels: SegmentChannels {
            pan: ChannelValue::Static(128),
            tilt: ChannelValue::Curve(curve),
            dimmer: ChannelValue::Static(255),
        },
        metadata: BTreeMap::new(),
    };
    let placements = effect_placements(&effect, &fixture());
    assert_eq!(placements.len(), 3);
    assert_eq!(placements[0].channel, PlacementChannel::Pan);
    assert_eq!(placements[0].dmx_channel, 11);
    assert_eq!(placements[0].value, PlacementValue::Static { dmx: 128 });
    assert_eq!(placements[2].dmx_channel, 15);
    match &placements[1].value {
        PlacementValue::ValueCurve { encoded } => {
            assert!(encoded.contains("Id=ID_VALUECURVE_DMX12|"));
            assert!(encoded.contains("Values=0.0000:0.00;1.0000:1.00|"));
        }
        other => panic!("expected a value curve, got {other:?}"),
    }
    assert!(placements.iter().all(|p| p.start_ms == 1000 && p.end_ms == 3000));
}
