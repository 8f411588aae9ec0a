#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// snap
// =============================================================

#[test]
fn snap_rounds_to_nearest_multiple() {
    assert_eq!(snap(5.0, 16.0), 0.0);
    assert_eq!(snap(9.0, 16.0), 16.0);
    assert_eq!(snap(74.0, 16.0), 80.0);
    assert_eq!(snap(61.0, 16.0), 64.0);
}

#[test]
fn snap_ties_round_away_from_zero() {
    assert_eq!(snap(8.0, 16.0), 16.0);
    assert_eq!(snap(-8.0, 16.0), -16.0);
    assert_eq!(snap(24.0, 16.0), 32.0);
}

#[test]
fn snap_negative_values() {
    assert_eq!(snap(-5.0, 16.0), 0.0);
    assert_eq!(snap(-20.0, 16.0), -16.0);
    assert_eq!(snap(-30.0, 16.0), -32.0);
}

#[test]
fn snap_never_returns_negative_zero() {
    let s = snap(-3.0, 16.0);
    assert_eq!(s, 0.0);
    assert!(s.is_sign_positive());
}

#[test]
fn snap_is_idempotent() {
    for pitch in [1.0, 8.0, 16.0, 32.0, 12.5] {
        let mut v = -500.0;
        while v <= 500.0 {
            let once = snap(v, pitch);
            assert_eq!(snap(once, pitch), once, "v={v} pitch={pitch}");
            v += 3.7;
        }
    }
}

#[test]
fn snap_result_is_multiple_of_pitch() {
    for pitch in [1.0, 8.0, 16.0, 64.0] {
        let mut v = -1000.0;
        while v <= 1000.0 {
            let s = snap(v, pitch);
            assert_eq!(s % pitch, 0.0, "v={v} pitch={pitch}");
            v += 7.3;
        }
    }
}

#[test]
fn snap_non_positive_pitch_is_identity() {
    assert_eq!(snap(13.3, 0.0), 13.3);
    assert_eq!(snap(13.3, -4.0), 13.3);
}

// =============================================================
// snap_point
// =============================================================

#[test]
fn snap_point_snaps_each_axis() {
    let p = snap_point(Point::new(5.0, 3.0), 16.0);
    assert_eq!(p, Point::new(0.0, 0.0));
    let p = snap_point(Point::new(23.0, -9.0), 16.0);
    assert_eq!(p, Point::new(16.0, -16.0));
}
