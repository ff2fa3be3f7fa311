use super::*;
use crate::{
    compile::plan::ShowPlan,
    fixture::config::{DmxChannelMap, MovementLimits, Orientation},
    timeline::model::{EffectOrigin, GapType},
};

const BASIC: &str = include_str!("../../data/show_basic.json");

fn group(ids: &[&str]) -> FixtureGroup {
    FixtureGroup {
        group_id: "g".to_string(),
        fixtures: ids
            .iter()
            .enumerate()
            .map(|(i, id)| FixtureConfig {
                fixture_id: id.to_string(),
                channels: DmxChannelMap {
                    pan: 1 + 10 * i as u16,
                    tilt: 2 + 10 * i as u16,
                    dimmer: 3 + 10 * i as u16,
                },
                range: PanTiltRange::default(),
                orientation: Orientation::default(),
                limits: MovementLimits::default(),
                role: None,
            })
            .collect(),
    }
}

fn template(repeat: serde_json::Value, steps: &[&str]) -> Template {
    let steps: Vec<serde_json::Value> = steps
        .iter()
        .map(|id| {
            serde_json::json!({
                "step_id": id,
                "duration_bars": 1.0,
                "geometry": {"id": "role_pose"},
                "movement": {"id": "sweep"},
                "dimmer": {"id": "hold"},
            })
        })
        .collect();
    serde_json::from_value(serde_json::json!({
        "template_id": "t",
        "steps": steps,
        "repeat": repeat,
    }))
    .unwrap()
}

fn section(start: f64, end: f64) -> SectionPlan {
    SectionPlan {
        section_id: "s".to_string(),
        template_id: "t".to_string(),
        start_bar: start,
        end_bar: end,
        fixtures: None,
    }
}

fn sequential() -> Choreographer {
    Choreographer::new(CompileConfig::default().with_parallel(false)).unwrap()
}

fn spans(effects: &[TimelineEffect]) -> Vec<(u64, u64)> {
    effects.iter().map(|e| (e.start_ms, e.end_ms)).collect()
}

fn render(t: &Template, s: &SectionPlan) -> (Vec<TimelineEffect>, Diagnostics) {
    let fixtures = group(&["mh1"]);
    let grid = BeatGrid::new(120.0, 4, 0.0).unwrap();
    let ctx = ShowContext::new(grid, &fixtures, &PoseResolver::standard(PanTiltRange::default()));
    let mut d = Diagnostics::new();
    let effects = sequential().render_section(t, s, &ctx, &mut d).unwrap();
    (effects, d)
}

#[test]
fn sequential_steps_without_contract() {
    let t = template(serde_json::Value::Null, &["a", "b"]);
    let (effects, _) = render(&t, &section(1.0, 2.5));
    assert_eq!(spans(&effects), vec![(2000, 4000), (4000, 5000)]);
    assert_eq!(effects[1].metadata["clipped_fraction"], 0.5);
}

#[test]
fn fade_out_remainder_ramps_dimmer_to_zero() {
    let t = template(
        serde_json::json!({"cycle_bars": 1.0, "loop_step_ids": ["a"], "remainder_policy": "FADE_OUT"}),
        &["a"],
    );
    let (effects, _) = render(&t, &section(0.0, 2.5));
    assert_eq!(spans(&effects), vec![(0, 2000), (2000, 4000), (4000, 5000)]);
    let last = &effects[2];
    assert_eq!(last.metadata["fade_out"], true);
    let dimmer = last.channels.dimmer.as_curve().unwrap();
    assert_eq!(dimmer.first().v, 255.0);
    assert_eq!(dimmer.last().v, 0.0);
    assert_eq!(effects[0].channels.dimmer, ChannelValue::Static(255));
}

#[test]
fn hold_remainder_freezes_last_pose() {
    let t = template(
        serde_json::json!({"cycle_bars": 2.0, "loop_step_ids": ["a", "b"]}),
        &["a", "b"],
    );
    let (effects, _) = render(&t, &section(0.0, 3.0));
    assert_eq!(spans(&effects), vec![(0, 2000), (2000, 4000), (4000, 6000)]);
    let hold = &effects[2];
    assert_eq!(hold.metadata["hold"], true);
    assert!(matches!(hold.channels.pan, ChannelValue::Static(_)));
    assert_eq!(hold.start_pose, hold.end_pose);
    let pan_end = effects[1].channels.pan.end_value();
    assert_eq!(hold.channels.pan.start_value(), pan_end.round());
}

#[test]
fn window_shorter_than_cycle_plays_partial_first_cycle() {
    let t = template(
        serde_json::json!({"cycle_bars": 2.0, "loop_step_ids": ["a", "b"], "remainder_policy": "TRUNCATE"}),
        &["a", "b"],
    );
    let (effects, _) = render(&t, &section(0.0, 1.5));
    assert_eq!(spans(&effects), vec![(0, 2000), (2000, 3000)]);
}

#[test]
fn crossfade_ends_instances_early() {
    let t = template(
        serde_json::json!({
            "cycle_bars": 1.0,
            "loop_step_ids": ["a"],
            "boundary_transition": {"type": "crossfade", "bars": 0.25},
        }),
        &["a"],
    );
    let (effects, _) = render(&t, &section(0.0, 2.0));
    assert_eq!(spans(&effects), vec![(0, 1500), (2000, 4000)]);
}

#[test]
fn section_subset_and_template_mismatch() {
    let t = template(serde_json::Value::Null, &["a"]);
    let fixtures = group(&["mh1", "mh2", "mh3"]);
    let grid = BeatGrid::new(120.0, 4, 0.0).unwrap();
    let ctx = ShowContext::new(grid, &fixtures, &PoseResolver::standard(PanTiltRange::default()));
    let mut s = section(0.0, 1.0);
    s.fixtures = Some(vec!["mh3".to_string(), "mh1".to_string()]);
    let mut d = Diagnostics::new();
    let effects = sequential().render_section(&t, &s, &ctx, &mut d).unwrap();
    let ids: Vec<&str> = effects.iter().map(|e| e.fixture_id.as_str()).collect();
    assert_eq!(ids, vec!["mh1", "mh3"]);

    s.template_id = "other".to_string();
    assert!(sequential().render_section(&t, &s, &ctx, &mut d).is_err());
}

#[test]
fn basic_show_is_gap_free_per_fixture() {
    let plan = ShowPlan::from_json_str(BASIC).unwrap();
    let show = sequential().render_show(&plan).unwrap();

    let gap_spans: Vec<(Option<&str>, u64, u64, GapType)> = show
        .gaps
        .iter()
        .map(|g| (g.fixture_id.as_deref(), g.start_ms, g.end_ms, g.gap_type))
        .collect();
    assert_eq!(
        gap_spans,
        vec![
            (Some("mh1"), 0, 2000, GapType::Start),
            (Some("mh2"), 0, 2000, GapType::Start),
            (Some("mh1"), 12_000, 20_000, GapType::End),
            (Some("mh2"), 12_000, 14_000, GapType::InterSection),
            (Some("mh2"), 18_000, 20_000, GapType::End),
        ]
    );

    for fixture in ["mh1", "mh2"] {
        let mut reach = 0;
        for e in show.effects.iter().filter(|e| e.fixture_id == fixture) {
            assert_eq!(e.start_ms, reach, "{fixture} hole at {reach}");
            reach = e.end_ms;
        }
        assert_eq!(reach, 20_000);
    }
    assert_eq!(show.effects.len(), 16);
    assert_eq!(show.effects.iter().filter(|e| e.is_transition()).count(), 5);
    assert!(show.effects.windows(2).all(|w| {
        (w[0].start_ms, &w[0].fixture_id, w[0].end_ms) <= (w[1].start_ms, &w[1].fixture_id, w[1].end_ms)
    }));
    assert!(matches!(
        &show.effects.iter().find(|e| e.start_ms == 14_000).unwrap().origin,
        EffectOrigin::Step { section_id, .. } if section_id == "chorus"
    ));
}

#[test]
fn parallel_matches_sequential() {
    let plan = ShowPlan::from_json_str(BASIC).unwrap();
    let seq = sequential().render_show(&plan).unwrap();
    let par = Choreographer::new(CompileConfig::default().with_threads(Some(3)))
        .unwrap()
        .render_show(&plan)
        .unwrap();
    assert_eq!(seq.fingerprint, par.fingerprint);
    assert_eq!(seq.effects, par.effects);
    assert_eq!(seq.diagnostics, par.diagnostics);
}

#[test]
fn zero_threads_is_rejected() {
    assert!(Choreographer::new(CompileConfig::default().with_threads(Some(0))).is_err());
}
