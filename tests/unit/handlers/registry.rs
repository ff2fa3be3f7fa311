use super::*;

struct Still;

impl MovementHandler for Still {
    fn handler_id(&self) -> &str {
        "sweep"
    }

    fn generate(
        &self,
        _params: &MovementParams,
        n_samples: usize,
        _cycles: f64,
        _intensity: Intensity,
        _diags: &mut Diagnostics,
    ) -> ChoreoResult<MovementCurves> {
        let flat = crate::curve::ops::sample(|_| 0.5, n_samples)?;
        Ok(MovementCurves {
            pan: flat.clone(),
            tilt: flat,
        })
    }
}

#[test]
fn builtins_are_reachable_by_id() {
    let reg = HandlerRegistry::with_builtins(&CurveFactory::default()).unwrap();
    assert_eq!(reg.geometry("role_pose").unwrap().handler_id(), "role_pose");
    assert_eq!(reg.geometry("fan").unwrap().handler_id(), "fan");
    assert_eq!(reg.dimmer("pulse").unwrap().handler_id(), "pulse");
    assert_eq!(reg.movement("circle").unwrap().handler_id(), "library");
    assert!(reg.movement_ids().iter().any(|id| id == "figure_eight"));
}

#[test]
fn unknown_ids_list_registered_ones() {
    let reg = HandlerRegistry::with_builtins(&CurveFactory::default()).unwrap();
    match reg.dimmer("strobe") {
        Err(ChoreoError::UnknownIdentifier { kind, id, valid }) => {
            assert_eq!(kind, "dimmer");
            assert_eq!(id, "strobe");
            assert_eq!(valid, vec!["fade_in", "fade_out", "hold", "pulse"]);
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("strobe should not resolve"),
    }
    assert!(matches!(
        reg.movement("moonwalk"),
        Err(ChoreoError::UnknownIdentifier { kind: "movement", .. })
    ));
}

#[test]
fn dedicated_movement_handler_shadows_library() {
    let mut reg = HandlerRegistry::with_builtins(&CurveFactory::default()).unwrap();
    reg.register_movement(Box::new(Still)).unwrap();
    let params = MovementParams {
        pattern_id: "sweep".to_string(),
        amplitude_degrees: None,
        base_pose: NormPose::CENTER,
        extra: serde_json::Value::Null,
    };
    let mut d = Diagnostics::new();
    let curves = reg
        .movement("sweep")
        .unwrap()
        .generate(&params, 8, 1.0, Intensity::Fast, &mut d)
        .unwrap();
    assert!(curves.pan.is_flat());
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut reg = HandlerRegistry::new();
    reg.register_movement(Box::new(Still)).unwrap();
    assert!(matches!(
        reg.register_movement(Box::new(Still)),
        Err(ChoreoError::Validation(_))
    ));
}

#[test]
fn params_must_be_object_or_null() {
    #[derive(Debug, Default, serde::Deserialize)]
    struct P {
        #[serde(default)]
        x: f64,
    }
    let p: P = parse_params("t", &serde_json::Value::Null).unwrap();
    assert_eq!(p.x, 0.0);
    let p: P = parse_params("t", &serde_json::json!({"x": 2.5})).unwrap();
    assert_eq!(p.x, 2.5);
    assert!(parse_params::<P>("t", &serde_json::json!([1])).is_err());
}

#[test]
fn intensity_uses_screaming_case() {
    let i: Intensity = serde_json::from_str("\"DRAMATIC\"").unwrap();
    assert_eq!(i, Intensity::Dramatic);
    assert_eq!(Intensity::default(), Intensity::Smooth);
}
