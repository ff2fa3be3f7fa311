use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = CompileConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.samples_per_cycle(), 32);
    assert_eq!(cfg.min_gap_ms(), 50.0);
    assert!(cfg.parallel());
    assert_eq!(cfg.fill_ease(), Ease::InOutSine);
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = CompileConfig::from_json_str(r#"{"min_gap_ms": 20, "threads": 2}"#).unwrap();
    assert_eq!(cfg.min_gap_ms(), 20.0);
    assert_eq!(cfg.threads(), Some(2));
    assert_eq!(cfg.max_samples(), 256);
}

#[test]
fn unknown_fields_and_bad_values_are_rejected() {
    assert!(matches!(
        CompileConfig::from_json_str(r#"{"min_gap": 20}"#),
        Err(ChoreoError::Serde(_))
    ));
    assert!(matches!(
        CompileConfig::from_json_str(r#"{"min_samples": 64, "max_samples": 16}"#),
        Err(ChoreoError::Validation(_))
    ));
    assert!(matches!(
        CompileConfig::from_json_str(r#"{"threads": 0}"#),
        Err(ChoreoError::Validation(_))
    ));
    assert!(CompileConfig::default().with_min_gap_ms(-1.0).validate().is_err());
}

#[test]
fn factory_follows_sample_settings() {
    let cfg = CompileConfig::from_json_str(
        r#"{"samples_per_cycle": 16, "min_samples": 4, "max_samples": 64}"#,
    )
    .unwrap();
    let f = cfg.curve_factory().unwrap();
    assert_eq!(f.samples_for(2.0), 32);
    assert_eq!(f.samples_for(0.1), 4);
    assert_eq!(f.samples_for(10.0), 64);
}
