#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// --- Point ---

#[test]
fn point_add_and_sub() {
    let a = Point::new(3.0, 4.0);
    let b = Point::new(1.0, -2.0);
    assert_eq!(a + b, Point::new(4.0, 2.0));
    assert_eq!(a - b, Point::new(2.0, 6.0));
}

#[test]
fn point_manhattan_length() {
    assert_eq!(Point::new(-3.0, 4.0).manhattan_length(), 7.0);
}

// --- Rect edges ---

#[test]
fn rect_edges_and_center() {
    let r = Rect::new(10.0, 20.0, 30.0, 40.0);
    assert_eq!(r.left(), 10.0);
    assert_eq!(r.top(), 20.0);
    assert_eq!(r.right(), 40.0);
    assert_eq!(r.bottom(), 60.0);
    assert_eq!(r.center(), Point::new(25.0, 40.0));
}

#[test]
fn rect_from_edges_round_trips() {
    let r = Rect::from_edges(-5.0, 2.0, 15.0, 12.0);
    assert_eq!(r, Rect::new(-5.0, 2.0, 20.0, 10.0));
}

#[test]
fn rect_normalized_flips_negative_size() {
    let r = Rect::new(10.0, 10.0, -10.0, -20.0).normalized();
    assert_eq!(r, Rect::new(0.0, -10.0, 10.0, 20.0));
}

#[test]
fn rect_contains_is_edge_inclusive() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains(Point::new(0.0, 0.0)));
    assert!(r.contains(Point::new(10.0, 10.0)));
    assert!(r.contains(Point::new(5.0, 5.0)));
    assert!(!r.contains(Point::new(10.1, 5.0)));
}

#[test]
fn rect_united_ignores_empty() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(a.united(&Rect::default()), a);
    assert_eq!(Rect::default().united(&a), a);
    let b = Rect::new(20.0, -5.0, 5.0, 5.0);
    assert_eq!(a.united(&b), Rect::from_edges(0.0, -5.0, 25.0, 10.0));
}

#[test]
fn rect_adjusted_moves_each_side() {
    let r = Rect::new(0.0, 0.0, 100.0, 100.0).adjusted(-10.0, -5.0, 10.0, 5.0);
    assert_eq!(r, Rect::from_edges(-10.0, -5.0, 110.0, 105.0));
}

#[test]
fn rect_bounding_of_points() {
    let r = Rect::bounding(&[Point::new(3.0, 1.0), Point::new(-1.0, 5.0), Point::new(2.0, -2.0)]);
    assert_eq!(r, Rect::from_edges(-1.0, -2.0, 3.0, 5.0));
    assert!(Rect::bounding(&[]).is_empty());
}

// --- Rotation ---

#[test]
fn rotate_about_quarter_turn() {
    let p = rotate_about(Point::new(10.0, 0.0), Point::new(0.0, 0.0), 90.0);
    assert!(approx_eq(p.x, 0.0));
    assert!(approx_eq(p.y, 10.0));
}

#[test]
fn angle_deg_uses_atan2() {
    let c = Point::new(0.0, 0.0);
    assert!(approx_eq(angle_deg(c, Point::new(1.0, 0.0)), 0.0));
    assert!(approx_eq(angle_deg(c, Point::new(0.0, 1.0)), 90.0));
    assert!(approx_eq(angle_deg(c, Point::new(-1.0, 0.0)), 180.0));
}

// --- Triangles ---

#[test]
fn triangle_contains_inside_and_outside() {
    let tri = [Point::new(64.0, 64.0), Point::new(0.0, 64.0), Point::new(64.0, 0.0)];
    assert!(triangle_contains(&tri, Point::new(50.0, 50.0)));
    assert!(triangle_contains(&tri, Point::new(64.0, 32.0)));
    assert!(!triangle_contains(&tri, Point::new(5.0, 5.0)));
}

#[test]
fn centroid_is_mean_of_vertices() {
    let tri = [Point::new(0.0, 0.0), Point::new(6.0, 0.0), Point::new(0.0, 9.0)];
    assert_eq!(centroid(&tri), Point::new(2.0, 3.0));
}
