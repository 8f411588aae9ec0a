#![allow(clippy::float_cmp)]

use super::*;
use crate::entity::{Entity, SurfaceType};
use crate::geom::Rect;

const GRID: f64 = 16.0;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn add_rect(scene: &mut Scene, x: f64, y: f64) -> EntityId {
    let e = Entity::rect(pt(x, y), Rect::new(0.0, 0.0, 32.0, 32.0));
    let id = e.id;
    scene.insert(e);
    id
}

// =============================================================
// Ghost creation
// =============================================================

#[test]
fn no_ghosts_before_first_move() {
    let mut scene = Scene::new();
    let a = add_rect(&mut scene, 0.0, 0.0);
    let dup = Duplication::new(a, pt(10.0, 10.0));
    assert!(dup.ghosts().is_empty());
    assert_eq!(scene.len(), 1);
}

#[test]
fn first_move_ghosts_selection_and_pressed() {
    let mut scene = Scene::new();
    let a = add_rect(&mut scene, 0.0, 0.0);
    let b = add_rect(&mut scene, 64.0, 0.0);
    let pressed = add_rect(&mut scene, 128.0, 0.0);
    scene.set_selected(&a, true);
    scene.set_selected(&b, true);

    let mut dup = Duplication::new(pressed, pt(140.0, 10.0));
    dup.update(&mut scene, pt(150.0, 10.0), GRID);

    assert_eq!(dup.ghosts().len(), 3);
    assert_eq!(scene.len(), 6);
    for g in dup.ghosts() {
        let ghost = scene.get(&g).unwrap();
        assert!(ghost.ghost);
        assert_eq!(ghost.opacity, 0.5);
        assert!(!ghost.selected);
    }
}

#[test]
fn pressed_entity_in_selection_is_not_ghosted_twice() {
    let mut scene = Scene::new();
    let a = add_rect(&mut scene, 0.0, 0.0);
    scene.set_selected(&a, true);
    let mut dup = Duplication::new(a, pt(0.0, 0.0));
    dup.update(&mut scene, pt(20.0, 0.0), GRID);
    assert_eq!(dup.ghosts().len(), 1);
}

#[test]
fn ghost_set_is_built_once() {
    let mut scene = Scene::new();
    let a = add_rect(&mut scene, 0.0, 0.0);
    let mut dup = Duplication::new(a, pt(0.0, 0.0));
    dup.update(&mut scene, pt(20.0, 0.0), GRID);
    dup.update(&mut scene, pt(40.0, 0.0), GRID);
    dup.update(&mut scene, pt(60.0, 30.0), GRID);
    assert_eq!(dup.ghosts().len(), 1);
    assert_eq!(scene.len(), 2);
}

// =============================================================
// Ghost movement
// =============================================================

#[test]
fn ghosts_follow_snapped_delta_from_source() {
    let mut scene = Scene::new();
    let a = add_rect(&mut scene, 32.0, 16.0);
    let mut dup = Duplication::new(a, pt(40.0, 20.0));
    dup.update(&mut scene, pt(77.0, 40.0), GRID);
    let g = dup.ghosts()[0];
    // delta (37, 20) snaps to (32, 16)
    assert_eq!(scene.get(&g).map(|e| e.pos), Some(pt(64.0, 32.0)));
    assert_eq!(scene.get(&a).map(|e| e.pos), Some(pt(32.0, 16.0)));
}

#[test]
fn ghost_is_structural_copy() {
    let mut scene = Scene::new();
    let mut e = Entity::right_triangle(pt(0.0, 0.0), 64.0);
    if let Some(shape) = e.shape_mut() {
        shape.surface = SurfaceType::Death;
        shape.texture.scale = 3.5;
        shape.texture.rotation = 45.0;
    }
    let id = e.id;
    scene.insert(e);

    let mut dup = Duplication::new(id, pt(0.0, 0.0));
    dup.update(&mut scene, pt(64.0, 0.0), GRID);
    let ghost = scene.get(&dup.ghosts()[0]).unwrap();
    assert_eq!(ghost.triangle_points(), scene.get(&id).unwrap().triangle_points());
    let shape = ghost.shape().unwrap();
    assert_eq!(shape.surface, SurfaceType::Death);
    assert_eq!(shape.texture.scale, 3.5);
    assert_eq!(shape.texture.rotation, 45.0);
    assert_eq!(ghost.pos, pt(64.0, 0.0));
}

#[test]
fn vanished_source_drops_its_ghost() {
    let mut scene = Scene::new();
    let a = add_rect(&mut scene, 0.0, 0.0);
    let b = add_rect(&mut scene, 64.0, 0.0);
    scene.set_selected(&a, true);
    scene.set_selected(&b, true);
    let mut dup = Duplication::new(a, pt(0.0, 0.0));
    dup.update(&mut scene, pt(16.0, 0.0), GRID);
    assert_eq!(dup.ghosts().len(), 2);

    scene.remove(&b);
    dup.update(&mut scene, pt(32.0, 0.0), GRID);
    assert_eq!(dup.ghosts().len(), 1);
    assert_eq!(scene.len(), 2);

    let promoted = dup.commit(&mut scene);
    assert_eq!(promoted.len(), 1);
}

// =============================================================
// Commit / abort
// =============================================================

#[test]
fn commit_adds_k_selected_copies() {
    let mut scene = Scene::new();
    let ids: Vec<EntityId> = (0_i32..4).map(|i| add_rect(&mut scene, f64::from(i) * 64.0, 0.0)).collect();
    for id in &ids {
        scene.set_selected(id, true);
    }
    let before = scene.len();

    let mut dup = Duplication::new(ids[0], pt(0.0, 0.0));
    dup.update(&mut scene, pt(5.0, 70.0), GRID);
    let promoted = dup.commit(&mut scene);

    assert_eq!(promoted.len(), 4);
    assert_eq!(scene.len(), before + 4);
    assert_eq!(scene.committed().count(), before + 4);
    for id in &ids {
        assert!(!scene.is_selected(id));
    }
    for id in &promoted {
        let e = scene.get(id).unwrap();
        assert!(e.selected);
        assert!(!e.ghost);
        assert_eq!(e.opacity, 1.0);
    }
    let mut ys: Vec<f64> = promoted.iter().map(|id| scene.get(id).unwrap().pos.y).collect();
    ys.dedup();
    assert_eq!(ys, vec![64.0]);
}

#[test]
fn commit_without_move_leaves_selection() {
    let mut scene = Scene::new();
    let a = add_rect(&mut scene, 0.0, 0.0);
    scene.set_selected(&a, true);
    let dup = Duplication::new(a, pt(0.0, 0.0));
    assert!(dup.commit(&mut scene).is_empty());
    assert!(scene.is_selected(&a));
    assert_eq!(scene.len(), 1);
}

#[test]
fn abort_removes_ghosts() {
    let mut scene = Scene::new();
    let a = add_rect(&mut scene, 0.0, 0.0);
    let mut dup = Duplication::new(a, pt(0.0, 0.0));
    dup.update(&mut scene, pt(48.0, 48.0), GRID);
    assert_eq!(scene.len(), 2);
    dup.abort(&mut scene);
    assert_eq!(scene.len(), 1);
    assert!(scene.contains(&a));
}
