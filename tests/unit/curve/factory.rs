use super::*;

const SHAPES: [WaveShape; 10] = [
    WaveShape::Sine,
    WaveShape::Cosine,
    WaveShape::Triangle,
    WaveShape::Sawtooth,
    WaveShape::Square { smoothing: 0.3 },
    WaveShape::RampUp,
    WaveShape::RampDown,
    WaveShape::Bounce,
    WaveShape::Pulse { duty: 0.5 },
    WaveShape::Hold { value: 0.7 },
];

#[test]
fn every_shape_stays_in_unit_range() {
    for shape in SHAPES {
        for i in 0..=400 {
            let v = shape.eval(i as f64 / 100.0 - 1.0);
            assert!((0.0..=1.0).contains(&v), "{shape:?} -> {v}");
        }
    }
}

#[test]
fn offset_shapes_start_at_centre() {
    for shape in [WaveShape::Sine, WaveShape::Triangle] {
        assert!((shape.eval(0.0) - 0.5).abs() < 1e-12, "{shape:?}");
        assert!((shape.eval(0.25) - 1.0).abs() < 1e-12, "{shape:?}");
    }
}

#[test]
fn kinds_are_stable() {
    assert_eq!(WaveShape::Sine.kind(), CurveKind::Offset);
    assert_eq!(WaveShape::Bounce.kind(), CurveKind::Absolute);
    assert_eq!(WaveShape::Hold { value: 0.5 }.kind(), CurveKind::Offset);
}

#[test]
fn samples_for_is_clamped() {
    let f = CurveFactory::default();
    assert_eq!(f.samples_for(0.0), 8);
    assert_eq!(f.samples_for(1.0), 32);
    assert_eq!(f.samples_for(2.5), 80);
    assert_eq!(f.samples_for(100.0), 256);
    assert_eq!(f.samples_for(f64::NAN), 32);
}

#[test]
fn factory_rejects_bad_bounds() {
    assert!(CurveFactory::new(1, 8, 16).is_err());
    assert!(CurveFactory::new(16, 1, 16).is_err());
    assert!(CurveFactory::new(16, 32, 16).is_err());
    assert!(CurveFactory::new(16, 4, 64).is_ok());
}

#[test]
fn whole_cycle_waves_close_their_loop() {
    let f = CurveFactory::default();
    for cycles in [1.0, 2.0, 3.0] {
        let c = f.wave(WaveShape::Sine, cycles, 0.0, 64).unwrap();
        assert_eq!(c.len(), 65);
        assert!((c.first().v - c.last().v).abs() < 1e-9);
    }
}

#[test]
fn ramps_ignore_cycles() {
    let f = CurveFactory::default();
    let c = f.wave(WaveShape::RampUp, 4.0, 0.0, 10).unwrap();
    assert_eq!(c.first().v, 0.0);
    assert_eq!(c.last().v, 1.0);
}

#[test]
fn wave_rejects_negative_cycles() {
    let f = CurveFactory::default();
    assert!(f.wave(WaveShape::Sine, -1.0, 0.0, 10).is_err());
    assert!(f.wave(WaveShape::Sine, 1.0, f64::INFINITY, 10).is_err());
}

#[test]
fn shapes_deserialize_with_tag() {
    let s: WaveShape = serde_json::from_str(r#"{"shape":"pulse","duty":0.25}"#).unwrap();
    assert_eq!(s, WaveShape::Pulse { duty: 0.25 });
    let s: WaveShape = serde_json::from_str(r#"{"shape":"sine"}"#).unwrap();
    assert_eq!(s, WaveShape::Sine);
}
