use super::*;

#[test]
fn beat_grid_validates() {
    assert!(BeatGrid::new(120.0, 4, 0.0).is_ok());
    assert!(BeatGrid::new(0.0, 4, 0.0).is_err());
    assert!(BeatGrid::new(f64::NAN, 4, 0.0).is_err());
    assert!(BeatGrid::new(120.0, 0, 0.0).is_err());
}

#[test]
fn beat_grid_converts_both_ways() {
    let g = BeatGrid::new(120.0, 4, 500.0).unwrap();
    assert_eq!(g.ms_per_bar(), 2000.0);
    assert_eq!(g.bars_to_ms(2.0), 4500.0);
    assert_eq!(g.ms_to_bars(4500.0), 2.0);
    assert_eq!(g.span_bars(1000.0, 9000.0), 4.0);
}

#[test]
fn norm_pose_clamps() {
    let p = NormPose::new(-0.5, 1.5);
    assert_eq!(p.pan, 0.0);
    assert_eq!(p.tilt, 1.0);
}
