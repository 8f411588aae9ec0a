use uuid::Uuid;

use super::*;
use crate::geom::Point;

// =============================================================
// Timed overlays
// =============================================================

#[test]
fn scale_overlay_hides_after_duration() {
    let mut o = Overlays::new(1000.0);
    let id = Uuid::new_v4();
    o.show_scale(id, 0.0);
    assert!(o.get(&id).is_some_and(|ov| ov.scale));
    assert!(o.tick(999.0).is_empty());
    assert_eq!(o.tick(1000.0), vec![id]);
    assert!(o.get(&id).is_none());
}

#[test]
fn new_change_restarts_timer() {
    let mut o = Overlays::new(1000.0);
    let id = Uuid::new_v4();
    o.show_scale(id, 0.0);
    o.show_scale(id, 800.0);
    assert!(o.tick(1200.0).is_empty());
    assert!(o.get(&id).is_some());
    assert_eq!(o.tick(1800.0), vec![id]);
}

#[test]
fn rotation_overlay_is_timed_too() {
    let mut o = Overlays::new(500.0);
    let id = Uuid::new_v4();
    o.show_rotation(id, 100.0);
    assert!(o.get(&id).is_some_and(|ov| ov.rotation && !ov.scale));
    assert_eq!(o.tick(600.0), vec![id]);
}

// =============================================================
// Offset overlay
// =============================================================

#[test]
fn offset_overlay_has_no_timer() {
    let mut o = Overlays::new(1000.0);
    let id = Uuid::new_v4();
    o.show_offset(id);
    assert!(o.tick(1_000_000.0).is_empty());
    assert!(o.get(&id).is_some_and(|ov| ov.offset));
    o.hide_offset(&id);
    assert!(o.get(&id).is_none());
}

#[test]
fn hiding_offset_keeps_scale() {
    let mut o = Overlays::new(1000.0);
    let id = Uuid::new_v4();
    o.show_offset(id);
    o.show_scale(id, 0.0);
    o.hide_offset(&id);
    assert!(o.get(&id).is_some_and(|ov| ov.scale && !ov.offset));
}

#[test]
fn hide_on_unknown_entity_is_noop() {
    let mut o = Overlays::new(1000.0);
    let id = Uuid::new_v4();
    o.hide_offset(&id);
    o.hide_rotation(&id);
    o.remove(&id);
    assert!(o.get(&id).is_none());
}

#[test]
fn overlays_are_per_entity() {
    let mut o = Overlays::new(1000.0);
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    o.show_scale(a, 0.0);
    o.show_scale(b, 500.0);
    assert_eq!(o.tick(1000.0), vec![a]);
    assert!(o.get(&b).is_some());
}

// =============================================================
// Text
// =============================================================

#[test]
fn lines_follow_visible_flags() {
    let mapping = TextureMapping { scale: 1.1, rotation: 90.0, offset: Point::new(16.0, -3.3), ..Default::default() };
    let all = Overlay { scale: true, offset: true, rotation: true, hide_at: None };
    assert_eq!(all.lines(&mapping), vec!["Scale: 1.1x", "Offset: x=16.0, y=-3.3", "Rotation: 90.0\u{b0}"]);

    let offset_only = Overlay { offset: true, ..Default::default() };
    assert_eq!(offset_only.lines(&mapping).len(), 1);
    assert!(Overlay::default().lines(&mapping).is_empty());
}
