//! Scene: the entity store, selection set, z-order and logical bounds.
//!
//! Entities live in a `Vec` in insertion order; draw order sorts by `z` with a
//! stable sort so insertion order breaks ties. Ghosts share the store with
//! committed entities but are skipped by hit-testing, snapshots and layer
//! listings until promoted.
//!
//! The scene also owns a liveness token. Deferred work holds a
//! [`SceneHandle`] and checks [`SceneHandle::is_alive`] before touching
//! anything, so notifications queued against a torn-down scene are dropped.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::rc::{Rc, Weak};

use crate::consts::{MIN_CANVAS_HEIGHT, MIN_CANVAS_WIDTH, VIEWPORT_MARGIN_RATIO};
use crate::entity::{Entity, EntityId, EntityKind};
use crate::geom::{Point, Rect};
use crate::hit::{Hit, hit_part};

/// Weak reference to a scene's liveness token.
#[derive(Debug, Clone)]
pub struct SceneHandle(Weak<()>);

impl SceneHandle {
    /// Whether the scene this handle was taken from still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// One row of the layer listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerEntry {
    pub id: EntityId,
    pub kind: EntityKind,
    pub z: i64,
    pub selected: bool,
}

/// Owns every entity placed on the map.
#[derive(Debug)]
pub struct Scene {
    entities: Vec<Entity>,
    bounds: Rect,
    min_canvas: Rect,
    life: Rc<()>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with the default minimum canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::with_min_canvas(MIN_CANVAS_WIDTH, MIN_CANVAS_HEIGHT)
    }

    /// Empty scene whose bounds never shrink below `width` x `height` at the origin.
    #[must_use]
    pub fn with_min_canvas(width: f64, height: f64) -> Self {
        let min_canvas = Rect::new(0.0, 0.0, width, height);
        Self { entities: Vec::new(), bounds: min_canvas, min_canvas, life: Rc::new(()) }
    }

    #[must_use]
    pub fn handle(&self) -> SceneHandle {
        SceneHandle(Rc::downgrade(&self.life))
    }

    // --- Collection ---

    /// Add an entity. An entity with the same id is replaced in place.
    pub fn insert(&mut self, entity: Entity) {
        if let Some(slot) = self.entities.iter_mut().find(|e| e.id == entity.id) {
            *slot = entity;
        } else {
            self.entities.push(entity);
        }
    }

    /// Remove an entity by id, returning it if it was present.
    pub fn remove(&mut self, id: &EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == *id)?;
        Some(self.entities.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == *id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Number of entities, ghosts included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Committed (non-ghost) entities in insertion order.
    pub fn committed(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| !e.ghost)
    }

    /// Every entity, ghosts included, bottom-most first.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Entity> {
        let mut out: Vec<&Entity> = self.entities.iter().collect();
        out.sort_by_key(|e| e.z);
        out
    }

    /// Replace all content. Incoming entities are committed and unselected.
    pub fn load(&mut self, entities: Vec<Entity>) {
        self.entities = entities
            .into_iter()
            .map(|mut e| {
                e.ghost = false;
                e.selected = false;
                e.opacity = 1.0;
                e
            })
            .collect();
    }

    // --- Selection ---

    /// Set the selection flag. Returns `Some(true)` only when the entity became selected.
    pub fn set_selected(&mut self, id: &EntityId, selected: bool) -> Option<bool> {
        let e = self.get_mut(id)?;
        let became = selected && !e.selected;
        e.selected = selected;
        Some(became)
    }

    #[must_use]
    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.get(id).is_some_and(|e| e.selected)
    }

    /// Deselect everything. Returns whether anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        let mut any = false;
        for e in &mut self.entities {
            any |= e.selected;
            e.selected = false;
        }
        any
    }

    /// Select every committed entity. Returns the ids that were newly selected.
    pub fn select_all(&mut self) -> Vec<EntityId> {
        let mut newly = Vec::new();
        for e in self.entities.iter_mut().filter(|e| !e.ghost) {
            if !e.selected {
                e.selected = true;
                newly.push(e.id);
            }
        }
        newly
    }

    /// Make `id` the only selected entity. Returns `Some(true)` if it was not selected before.
    pub fn select_only(&mut self, id: &EntityId) -> Option<bool> {
        let was = self.get(id)?.selected;
        for e in &mut self.entities {
            e.selected = e.id == *id;
        }
        Some(!was)
    }

    /// Selected entity ids, bottom-most first.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<EntityId> {
        self.sorted().into_iter().filter(|e| e.selected).map(|e| e.id).collect()
    }

    // --- Z-order ---

    /// Place `id` above every entity: `max(z) + 1`. Returns the new z.
    pub fn raise_to_front(&mut self, id: &EntityId) -> Option<i64> {
        let max = self.entities.iter().map(|e| e.z).max()?;
        let e = self.get_mut(id)?;
        e.z = max + 1;
        Some(e.z)
    }

    /// Place `id` below every entity: `min(z) - 1`. Returns the new z.
    pub fn send_to_back(&mut self, id: &EntityId) -> Option<i64> {
        let min = self.entities.iter().map(|e| e.z).min()?;
        let e = self.get_mut(id)?;
        e.z = min - 1;
        Some(e.z)
    }

    // --- Deletion ---

    /// Remove every selected entity. Returns the removed ids.
    pub fn remove_selected(&mut self) -> Vec<EntityId> {
        let doomed = self.selected_ids();
        for id in &doomed {
            self.remove(id);
        }
        doomed
    }

    /// Delete command on `id`: the whole selection if `id` is part of it,
    /// otherwise just `id`.
    pub fn delete_command(&mut self, id: &EntityId) -> Vec<EntityId> {
        if self.is_selected(id) {
            return self.remove_selected();
        }
        self.remove(id).map(|e| vec![e.id]).unwrap_or_default()
    }

    // --- Hit-testing ---

    /// Top-most committed entity under `scene_pt`, with the part that was hit.
    #[must_use]
    pub fn hit_test(&self, scene_pt: Point, margin: f64, radius: f64) -> Option<Hit> {
        self.sorted()
            .into_iter()
            .rev()
            .filter(|e| !e.ghost)
            .find_map(|e| hit_part(e, scene_pt, margin, radius).map(|part| Hit { entity_id: e.id, part }))
    }

    // --- Bounds ---

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[must_use]
    pub fn min_canvas(&self) -> Rect {
        self.min_canvas
    }

    /// Union of every committed entity's scene bounding box.
    #[must_use]
    pub fn content_bounds(&self) -> Rect {
        self.committed().fold(Rect::default(), |acc, e| acc.united(&e.scene_bounds()))
    }

    /// Push each bounds edge out when the visible area comes within the margin of it.
    ///
    /// The margin is 10% of the visible extent on each axis. Returns whether the bounds changed.
    pub fn extend_for_viewport(&mut self, visible: Rect) -> bool {
        let mx = visible.width * VIEWPORT_MARGIN_RATIO;
        let my = visible.height * VIEWPORT_MARGIN_RATIO;
        let b = self.bounds;
        let (mut left, mut top, mut right, mut bottom) = (b.left(), b.top(), b.right(), b.bottom());

        if visible.left() < b.left() + mx {
            left = visible.left() - mx;
        }
        if visible.right() > b.right() - mx {
            right = visible.right() + mx;
        }
        if visible.top() < b.top() + my {
            top = visible.top() - my;
        }
        if visible.bottom() > b.bottom() - my {
            bottom = visible.bottom() + my;
        }

        let next = Rect::from_edges(left, top, right, bottom);
        if next == self.bounds {
            return false;
        }
        self.bounds = next;
        true
    }

    /// Shrink bounds to content plus margin, united with the visible area and
    /// the minimum canvas. Returns whether the bounds changed.
    pub fn shrink_to_content(&mut self, visible: Rect) -> bool {
        let content = self.content_bounds();
        let next = if content.is_empty() {
            self.min_canvas.united(&visible)
        } else {
            let mx = visible.width * VIEWPORT_MARGIN_RATIO;
            let my = visible.height * VIEWPORT_MARGIN_RATIO;
            content.adjusted(-mx, -my, mx, my).united(&visible).united(&self.min_canvas)
        };
        if next == self.bounds {
            return false;
        }
        self.bounds = next;
        true
    }

    // --- Drawing geometry ---

    /// Grid line segments covering `visible`, starting on a grid multiple.
    #[must_use]
    pub fn grid_lines(visible: Rect, pitch: f64) -> Vec<(Point, Point)> {
        if pitch <= 0.0 || visible.is_empty() {
            return Vec::new();
        }
        let left = (visible.left() / pitch).floor() * pitch;
        let top = (visible.top() / pitch).floor() * pitch;
        let (right, bottom) = (visible.right(), visible.bottom());

        let mut lines = Vec::new();
        let mut x = left;
        while x <= right {
            lines.push((Point::new(x, top), Point::new(x, bottom)));
            x += pitch;
        }
        let mut y = top;
        while y <= bottom {
            lines.push((Point::new(left, y), Point::new(right, y)));
            y += pitch;
        }
        lines
    }

    /// Scene-space outlines of every selected entity, drawn after all entities.
    #[must_use]
    pub fn selection_outlines(&self) -> Vec<Vec<Point>> {
        self.sorted().into_iter().filter(|e| e.selected).map(Entity::scene_outline).collect()
    }

    /// Committed entities for the layer panel, top-most first.
    #[must_use]
    pub fn layers(&self) -> Vec<LayerEntry> {
        self.sorted()
            .into_iter()
            .rev()
            .filter(|e| !e.ghost)
            .map(|e| LayerEntry { id: e.id, kind: e.kind(), z: e.z, selected: e.selected })
            .collect()
    }
}
