use super::*;
use crate::schedule::repeat::{BoundaryTransition, RemainderPolicy, RepeatMode};

fn step(id: &str, bars: f64) -> TemplateStep {
    serde_json::from_value(serde_json::json!({
        "step_id": id,
        "duration_bars": bars,
        "geometry": {"id": "role_pose"},
        "movement": {"id": "sweep"},
        "dimmer": {"id": "hold"},
    }))
    .unwrap()
}

fn repeat(ids: &[&str]) -> RepeatContract {
    RepeatContract {
        cycle_bars: 4.0,
        loop_step_ids: ids.iter().map(|s| s.to_string()).collect(),
        mode: RepeatMode::PingPong,
        remainder_policy: RemainderPolicy::HoldLastPose,
        joiner_step_id: None,
        boundary_transition: BoundaryTransition::Snap,
    }
}

#[test]
fn step_defaults_from_json() {
    let s = step("a", 2.0);
    assert_eq!(s.intensity, Intensity::Smooth);
    assert_eq!(s.phase, PhaseOffset::None);
    assert!(s.phase_wrap);
    assert_eq!(s.movement.cycles, 1.0);
    assert_eq!((s.dimmer.min_norm, s.dimmer.max_norm), (0.0, 1.0));
    assert!(s.geometry.params.is_null());
    s.validate().unwrap();
}

#[test]
fn spread_offsets_chase_across_group() {
    let p = PhaseOffset::Spread { total: 0.5 };
    assert_eq!(p.offset_for(0, 4), 0.0);
    assert_eq!(p.offset_for(2, 4), 0.25);
    assert_eq!(p.offset_for(0, 0), 0.0);
    assert_eq!(PhaseOffset::Fixed { offset: 0.1 }.offset_for(3, 4), 0.1);
}

#[test]
fn step_validation_rejects_bad_ranges() {
    let mut s = step("a", 0.0);
    assert!(s.validate().is_err());
    s.duration_bars = 1.0;
    s.dimmer.min_norm = 0.8;
    s.dimmer.max_norm = 0.2;
    let err = s.validate().unwrap_err();
    assert!(err.to_string().contains("dimmer range"));
    s.dimmer.min_norm = 0.0;
    s.movement.amplitude_degrees = Some(-5.0);
    assert!(s.validate().is_err());
}

#[test]
fn duplicate_and_missing_step_ids() {
    let t = Template {
        template_id: "t".to_string(),
        steps: vec![step("a", 1.0), step("a", 1.0)],
        repeat: None,
    };
    assert!(t.validate().unwrap_err().to_string().contains("duplicate step id"));

    let t = Template {
        template_id: "t".to_string(),
        steps: vec![step("a", 1.0)],
        repeat: Some(repeat(&["a", "ghost"])),
    };
    assert!(t.validate().unwrap_err().to_string().contains("'ghost'"));

    let empty = Template {
        template_id: "t".to_string(),
        steps: Vec::new(),
        repeat: None,
    };
    assert!(empty.validate().is_err());
}

#[test]
fn joiner_step_must_exist() {
    let mut r = repeat(&["a"]);
    r.mode = RepeatMode::Joiner;
    r.joiner_step_id = Some("bridge".to_string());
    let t = Template {
        template_id: "t".to_string(),
        steps: vec![step("a", 1.0)],
        repeat: Some(r),
    };
    assert!(t.validate().is_err());
}

#[test]
fn loop_durations_follow_contract_order() {
    let t = Template {
        template_id: "t".to_string(),
        steps: vec![step("a", 1.0), step("b", 3.0)],
        repeat: Some(repeat(&["b", "a"])),
    };
    t.validate().unwrap();
    assert_eq!(t.loop_durations().unwrap(), Some(vec![3.0, 1.0]));
    assert_eq!(t.total_bars(), 4.0);
    assert!(matches!(
        t.step("c").unwrap_err(),
        ChoreoError::UnknownIdentifier { kind: "step", .. }
    ));
}
