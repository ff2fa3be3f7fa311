use super::*;
use crate::curve::ops::sample;

fn pts(raw: &[(f64, f64)]) -> Vec<CurvePoint> {
    raw.iter().map(|&(t, v)| CurvePoint::new(t, v)).collect()
}

fn strictly_increasing(c: &Curve) -> bool {
    c.points().windows(2).all(|w| w[0].t < w[1].t)
}

fn wavy() -> Curve {
    sample(
        |t| 0.5 + 0.4 * (t * std::f64::consts::TAU * 3.0).sin() + 0.01 * (t * 97.0).sin(),
        200,
    )
    .unwrap()
}

#[test]
fn exact_collinear_points_are_removed_at_zero_epsilon() {
    let line = sample(|t| 0.25 + 0.5 * t, 10).unwrap();
    let s = simplify_rdp(&line, 0.0, DistanceScale::default()).unwrap();
    assert_eq!(s.len(), 2);
    assert_eq!(s.first(), line.first());
    assert_eq!(s.last(), line.last());

    let g = simplify_near_collinear(&line, 0.0).unwrap();
    assert_eq!(g.len(), 2);
}

#[test]
fn corner_survives() {
    let c = Curve::new(pts(&[(0.0, 0.0), (0.25, 0.25), (0.5, 1.0), (0.75, 0.5), (1.0, 0.0)]))
        .unwrap();
    let s = simplify_rdp(&c, 0.01, DistanceScale::default()).unwrap();
    assert!(s.points().contains(&CurvePoint::new(0.5, 1.0)));
}

#[test]
fn rdp_invariants_hold_across_epsilons() {
    let c = wavy();
    for eps in [0.0, 1e-20, 0.001, 0.01, 0.05, 0.2, 1.0] {
        let s = simplify_rdp(&c, eps, DistanceScale::default()).unwrap();
        assert_eq!(s.first(), c.first(), "eps={eps}");
        assert_eq!(s.last(), c.last(), "eps={eps}");
        assert!(strictly_increasing(&s), "eps={eps}");
        let again = simplify_rdp(&s, eps, DistanceScale::default()).unwrap();
        assert_eq!(again, s, "eps={eps} not idempotent");
    }
}

#[test]
fn larger_epsilon_never_keeps_more_points() {
    let c = wavy();
    let fine = simplify_rdp(&c, 0.005, DistanceScale::default()).unwrap();
    let coarse = simplify_rdp(&c, 0.1, DistanceScale::default()).unwrap();
    assert!(coarse.len() <= fine.len());
    assert!(fine.len() < c.len());
}

#[test]
fn value_scale_changes_what_counts_as_a_wobble() {
    // One DMX step of wobble on a 0..255 scale.
    let c = Curve::new(pts(&[(0.0, 100.0), (0.5, 101.0), (1.0, 100.0)])).unwrap();
    let keep = simplify_rdp(&c, 0.5, DistanceScale::default()).unwrap();
    assert_eq!(keep.len(), 3);
    let drop = simplify_rdp(&c, 0.5, DistanceScale { t: 1.0, v: 0.1 }).unwrap();
    assert_eq!(drop.len(), 2);
}

#[test]
fn duplicate_times_are_collapsed() {
    let c = Curve::new(pts(&[(0.0, 0.0), (0.0, 0.3), (0.5, 0.0), (0.5, 1.0), (1.0, 1.0)]))
        .unwrap();
    let s = simplify_rdp(&c, 0.0, DistanceScale::default()).unwrap();
    assert!(strictly_increasing(&s));
    assert_eq!(s.first(), c.first());
    assert_eq!(s.last(), c.last());
}

#[test]
fn bad_arguments_are_rejected() {
    let c = wavy();
    assert!(simplify_rdp(&c, -1.0, DistanceScale::default()).is_err());
    assert!(simplify_rdp(&c, f64::NAN, DistanceScale::default()).is_err());
    assert!(simplify_rdp(&c, 0.1, DistanceScale { t: -1.0, v: 1.0 }).is_err());
    assert!(simplify_near_collinear(&c, -0.5).is_err());
}
