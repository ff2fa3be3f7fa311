use super::*;

const BASIC: &str = include_str!("../../data/show_basic.json");

#[test]
fn parses_and_validates_basic_show() {
    let plan = ShowPlan::from_json_str(BASIC).unwrap();
    assert_eq!(plan.song_duration_ms, 20_000);
    assert_eq!(plan.beat_grid.ms_per_bar(), 2000.0);
    assert_eq!(plan.fixtures.len(), 2);
    assert_eq!(plan.sections[1].fixtures.as_deref(), Some(&["mh2".to_string()][..]));
    assert_eq!(plan.sections[0].duration_bars(), 5.0);
    assert_eq!(
        plan.custom_pose_pairs(),
        vec![("drummer".to_string(), PanTilt::new(30.0, -10.0))]
    );
    assert_eq!(plan.template("chorus_hit").unwrap().steps.len(), 1);
}

#[test]
fn unknown_template_lists_valid_ids() {
    let plan = ShowPlan::from_json_str(BASIC).unwrap();
    let err = plan.template("bridge").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("bridge"), "{msg}");
    assert!(msg.contains("chorus_hit") && msg.contains("verse_loop"), "{msg}");
}

#[test]
fn rejects_bad_sections() {
    let base: ShowPlan = serde_json::from_str(BASIC).unwrap();

    let mut plan = base.clone();
    plan.sections[0].end_bar = plan.sections[0].start_bar;
    assert!(matches!(plan.validate().unwrap_err(), ChoreoError::Validation(_)));

    let mut plan = base.clone();
    plan.sections[1].section_id = "verse".to_string();
    assert!(plan.validate().unwrap_err().to_string().contains("duplicate section_id"));

    let mut plan = base.clone();
    plan.sections[1].fixtures = Some(vec!["mh9".to_string()]);
    assert!(matches!(
        plan.validate().unwrap_err(),
        ChoreoError::UnknownIdentifier { kind: "fixture", .. }
    ));

    let mut plan = base;
    plan.templates.push(plan.templates[0].clone());
    assert!(plan.validate().unwrap_err().to_string().contains("duplicate template_id"));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = ShowPlan::from_json_str("{\"song_duration_ms\": -1}").unwrap_err();
    assert!(matches!(err, ChoreoError::Serde(_)));
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = ShowPlan::from_path("/nonexistent/show.json").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/show.json"));
}
