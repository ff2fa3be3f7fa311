use super::*;

#[test]
fn round_time_is_stable_and_drops_negative_zero() {
    assert_eq!(round_time(1.0 / 3.0), 0.333333);
    assert_eq!(round_time(-0.0000001).to_bits(), 0.0f64.to_bits());
}

#[test]
fn wrap_unit_keeps_whole_overflow_on_one() {
    assert_eq!(wrap_unit(0.0), 0.0);
    assert_eq!(wrap_unit(1.0), 1.0);
    assert_eq!(wrap_unit(2.0), 1.0);
    assert!((wrap_unit(1.25) - 0.25).abs() < 1e-12);
    assert!((wrap_unit(-0.25) - 0.75).abs() < 1e-12);
}

#[test]
fn dmx_from_unit_clamps() {
    assert_eq!(dmx_from_unit(-1.0), 0);
    assert_eq!(dmx_from_unit(0.5), 128);
    assert_eq!(dmx_from_unit(2.0), 255);
}
