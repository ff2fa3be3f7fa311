use super::*;

fn pts(raw: &[(f64, f64)]) -> Vec<CurvePoint> {
    raw.iter().map(|&(t, v)| CurvePoint::new(t, v)).collect()
}

#[test]
fn new_rejects_short_unsorted_and_non_finite() {
    assert!(Curve::new(pts(&[(0.0, 0.0)])).is_err());
    assert!(Curve::new(pts(&[(0.5, 0.0), (0.2, 1.0)])).is_err());
    assert!(Curve::new(pts(&[(0.0, f64::NAN), (1.0, 1.0)])).is_err());
    assert!(Curve::new(pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)])).is_ok());
}

#[test]
fn value_at_interpolates_and_clamps() {
    let c = Curve::new(pts(&[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)])).unwrap();
    assert_eq!(c.value_at(-1.0), 0.0);
    assert_eq!(c.value_at(0.25), 0.5);
    assert_eq!(c.value_at(0.5), 1.0);
    assert_eq!(c.value_at(0.75), 0.5);
    assert_eq!(c.value_at(2.0), 0.0);
}

#[test]
fn value_at_step_takes_right_side() {
    let c = Curve::new(pts(&[(0.0, 0.0), (0.5, 0.0), (0.5, 1.0), (1.0, 1.0)])).unwrap();
    assert_eq!(c.value_at(0.5), 1.0);
    assert_eq!(c.value_at(0.49), 0.0);
}

#[test]
fn grid_detection() {
    let g = Curve::from_grid_values(&[0.0, 1.0, 0.0, 1.0]).unwrap();
    assert_eq!(g.uniform_grid_size(), Some(3));
    let ng = Curve::new(pts(&[(0.0, 0.0), (0.1, 1.0), (1.0, 0.0)])).unwrap();
    assert_eq!(ng.uniform_grid_size(), None);
}

#[test]
fn serde_roundtrip_validates() {
    let c = Curve::from_grid_values(&[0.2, 0.8]).unwrap();
    let json = serde_json::to_string(&c).unwrap();
    let back: Curve = serde_json::from_str(&json).unwrap();
    assert_eq!(c, back);
    assert!(serde_json::from_str::<Curve>("[{\"t\":0.0,\"v\":1.0}]").is_err());
}

#[test]
fn interpolate_empty_is_zero() {
    assert_eq!(interpolate(&[], 0.3), 0.0);
}
