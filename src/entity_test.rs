#![allow(clippy::float_cmp)]

use super::*;

const GRID: f64 = 16.0;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// Construction and kind
// =============================================================

#[test]
fn constructors_set_kind_and_defaults() {
    let r = Entity::rect(pt(0.0, 0.0), Rect::new(0.0, 0.0, 64.0, 64.0));
    assert_eq!(r.kind(), EntityKind::Rect);
    assert_eq!(r.shape().map(|s| s.surface), Some(SurfaceType::Static));

    let t = Entity::right_triangle(pt(0.0, 0.0), 64.0);
    assert_eq!(t.kind(), EntityKind::Triangle);
    assert_eq!(t.shape().map(|s| s.surface), Some(SurfaceType::Ramp));
    assert_eq!(t.triangle_points(), Some([pt(64.0, 64.0), pt(0.0, 64.0), pt(64.0, 0.0)]));

    let j = Entity::jump_pad(pt(0.0, 0.0), pt(0.0, 0.3), 0.0);
    assert_eq!(j.kind(), EntityKind::JumpPad);
    assert_eq!(j.local_rect(), Some(Rect::new(0.0, 0.0, 96.0, 32.0)));

    assert_eq!(Entity::spawn(pt(0.0, 0.0)).kind(), EntityKind::Spawn);
    assert_eq!(Entity::start_line(pt(0.0, 0.0)).kind(), EntityKind::StartLine);
    assert_eq!(Entity::portal(pt(0.0, 0.0), PortalRole::Exit, 3).kind(), EntityKind::Portal);
    assert_eq!(Entity::item(pt(0.0, 0.0), WeaponType::Rocket, 5, true).kind(), EntityKind::Item);
}

#[test]
fn only_rects_and_triangles_are_texturable() {
    assert!(Entity::rect(pt(0.0, 0.0), Rect::new(0.0, 0.0, 16.0, 16.0)).is_texturable());
    assert!(Entity::right_triangle(pt(0.0, 0.0), 32.0).is_texturable());
    assert!(!Entity::jump_pad(pt(0.0, 0.0), pt(0.0, 0.3), 0.0).is_texturable());
    assert!(!Entity::spawn(pt(0.0, 0.0)).is_texturable());
    assert!(!Entity::item(pt(0.0, 0.0), WeaponType::Plasma, 10, false).is_texturable());
}

#[test]
fn new_entities_are_visible_unselected_committed() {
    let e = Entity::spawn(pt(0.0, 0.0));
    assert!(!e.selected);
    assert!(!e.ghost);
    assert_eq!(e.opacity, 1.0);
}

#[test]
fn kind_names_are_snake_case() {
    assert_eq!(EntityKind::JumpPad.name(), "jump_pad");
    assert_eq!(EntityKind::StartLine.name(), "start_line");
}

// =============================================================
// Position interception
// =============================================================

#[test]
fn rect_small_move_snaps_back_to_origin() {
    let mut e = Entity::rect(pt(0.0, 0.0), Rect::new(0.0, 0.0, 32.0, 32.0));
    let changed = e.move_to(pt(5.0, 3.0), GRID);
    assert!(!changed);
    assert_eq!(e.scene_top_left(), pt(0.0, 0.0));
}

#[test]
fn rect_snaps_scene_top_left_not_raw_position() {
    // Local origin (4, 4): the visible top-left must land on the grid.
    let e = Entity::rect(pt(0.0, 0.0), Rect::new(4.0, 4.0, 32.0, 32.0));
    let p = e.intercept_position(pt(30.0, 30.0), GRID);
    assert_eq!(p, pt(28.0, 28.0));
    assert_eq!(p + pt(4.0, 4.0), pt(32.0, 32.0));
}

#[test]
fn triangle_snaps_raw_position() {
    let mut e = Entity::right_triangle(pt(0.0, 0.0), 64.0);
    assert!(e.move_to(pt(23.0, 41.0), GRID));
    assert_eq!(e.pos, pt(16.0, 48.0));
}

#[test]
fn point_entities_snap_raw_position() {
    let mut e = Entity::spawn(pt(0.0, 0.0));
    e.move_to(pt(-9.0, 7.0), GRID);
    assert_eq!(e.pos, pt(-16.0, 0.0));
}

// =============================================================
// Coordinates and containment
// =============================================================

#[test]
fn to_local_and_to_scene_invert() {
    let mut e = Entity::jump_pad(pt(32.0, 64.0), pt(0.0, 0.3), 30.0);
    e.rotation = 30.0;
    let local = pt(10.0, 5.0);
    let back = e.to_local(e.to_scene(local));
    assert!((back.x - local.x).abs() < 1e-9);
    assert!((back.y - local.y).abs() < 1e-9);
}

#[test]
fn rotated_jump_pad_bounds_grow() {
    let e = Entity::jump_pad(pt(0.0, 0.0), pt(0.0, 0.3), 90.0);
    let b = e.scene_bounds();
    // 96x32 rotated a quarter turn about its center (48, 16).
    assert!((b.width - 32.0).abs() < 1e-9);
    assert!((b.height - 96.0).abs() < 1e-9);
    assert!((b.center().x - 48.0).abs() < 1e-9);
}

#[test]
fn contains_uses_scene_position() {
    let e = Entity::rect(pt(100.0, 100.0), Rect::new(0.0, 0.0, 32.0, 32.0));
    assert!(e.contains(pt(116.0, 116.0)));
    assert!(!e.contains(pt(16.0, 16.0)));
}

#[test]
fn triangle_contains_only_inside_hypotenuse() {
    let e = Entity::right_triangle(pt(0.0, 0.0), 64.0);
    assert!(e.contains(pt(60.0, 60.0)));
    assert!(!e.contains(pt(4.0, 4.0)));
}

#[test]
fn scene_outline_of_triangle_is_translated() {
    let e = Entity::right_triangle(pt(16.0, 32.0), 64.0);
    assert_eq!(e.scene_outline(), vec![pt(80.0, 96.0), pt(16.0, 96.0), pt(80.0, 32.0)]);
}

// =============================================================
// Geometry helpers
// =============================================================

#[test]
fn snap_edges_snaps_each_side() {
    let r = snap_edges(Rect::from_edges(3.0, -7.0, 74.0, 61.0), GRID);
    assert_eq!(r, Rect::from_edges(0.0, 0.0, 80.0, 64.0));
}

#[test]
fn enforce_min_size_grows_small_sides() {
    let r = enforce_min_size(Rect::new(16.0, 16.0, 0.0, 4.0), GRID);
    assert_eq!(r, Rect::new(16.0, 16.0, 16.0, 16.0));
}

#[test]
fn snap_vertices_rounds_triangle_points() {
    let mut e = Entity::triangle(pt(0.0, 0.0), [pt(3.0, 60.0), pt(70.0, 70.0), pt(62.0, 9.0)]);
    e.snap_vertices(GRID);
    assert_eq!(e.triangle_points(), Some([pt(0.0, 64.0), pt(64.0, 64.0), pt(64.0, 16.0)]));
}

// =============================================================
// Duplication and serde
// =============================================================

#[test]
fn duplicate_copies_structure_with_new_id() {
    let mut e = Entity::rect(pt(32.0, 16.0), Rect::new(0.0, 0.0, 48.0, 32.0));
    e.selected = true;
    e.z = 7;
    if let Some(tex) = e.texture_mut() {
        tex.path = Some("stone.png".into());
        tex.scale = 2.5;
        tex.offset = pt(4.0, 8.0);
    }
    if let Some(shape) = e.shape_mut() {
        shape.surface = SurfaceType::Death;
    }

    let d = e.duplicate();
    assert_ne!(d.id, e.id);
    assert!(!d.selected);
    assert_eq!(d.pos, e.pos);
    assert_eq!(d.z, 7);
    assert_eq!(d.local_rect(), e.local_rect());
    assert_eq!(d.shape().map(|s| s.surface), Some(SurfaceType::Death));
    let tex = d.texture().unwrap();
    assert_eq!(tex.path.as_deref(), Some("stone.png"));
    assert_eq!(tex.scale, 2.5);
    assert_eq!(tex.offset, pt(4.0, 8.0));
}

#[test]
fn serde_skips_transient_state() {
    let mut e = Entity::item(pt(16.0, 32.0), WeaponType::Rocket, 25, true);
    e.selected = true;
    e.ghost = true;
    e.opacity = 0.5;
    let json = serde_json::to_value(&e).unwrap();
    assert_eq!(json["data"]["kind"], "item");
    assert_eq!(json["data"]["weapon"], "rocket");
    assert!(json.get("selected").is_none());

    let back: Entity = serde_json::from_value(json).unwrap();
    assert_eq!(back.id, e.id);
    assert!(!back.selected);
    assert!(!back.ghost);
    assert_eq!(back.opacity, 1.0);
}
