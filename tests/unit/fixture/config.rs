use super::*;

fn fixture(id: &str, base: u16) -> FixtureConfig {
    FixtureConfig {
        fixture_id: id.to_string(),
        channels: DmxChannelMap {
            pan: base,
            tilt: base + 1,
            dimmer: base + 2,
        },
        range: PanTiltRange::default(),
        orientation: Orientation::default(),
        limits: MovementLimits::default(),
        role: None,
    }
}

#[test]
fn minimal_json_fills_defaults() {
    let f: FixtureConfig = serde_json::from_value(serde_json::json!({
        "fixture_id": "mh1",
        "channels": { "pan": 1, "tilt": 3, "dimmer": 6 },
        "limits": { "avoid_backward": true }
    }))
    .unwrap();
    assert_eq!(f.range, PanTiltRange::default());
    assert_eq!(f.orientation.pan_front_dmx, 128);
    assert_eq!(f.limits.pan_max, 255);
    assert!(f.limits.avoid_backward);
    f.validate().unwrap();
}

#[test]
fn channel_map_validation() {
    let mut f = fixture("a", 1);
    f.channels.tilt = 1;
    assert!(f.validate().is_err());
    let mut f = fixture("a", 1);
    f.channels.dimmer = 0;
    assert!(f.validate().is_err());
}

#[test]
fn inverted_limits_are_rejected() {
    let mut f = fixture("a", 1);
    f.limits.tilt_min = 200;
    f.limits.tilt_max = 100;
    assert!(matches!(f.validate(), Err(ChoreoError::Validation(_))));
}

#[test]
fn group_rejects_duplicates_and_reports_unknown() {
    let g = FixtureGroup {
        group_id: "truss".to_string(),
        fixtures: vec![fixture("a", 1), fixture("a", 10)],
    };
    assert!(g.validate().is_err());

    let g = FixtureGroup {
        group_id: "truss".to_string(),
        fixtures: vec![fixture("a", 1), fixture("b", 10)],
    };
    g.validate().unwrap();
    assert_eq!(g.index_of("b"), Some(1));
    let err = g.get("zzz").unwrap_err();
    assert!(err.to_string().contains("valid: a, b"));
}
