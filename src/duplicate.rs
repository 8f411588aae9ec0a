//! Duplicate-drag: ghost previews of the selection that become real on release.
//!
//! The ghost set is built lazily on the first pointer move. Ghosts are full
//! copies of their sources at reduced opacity and are inserted into the scene
//! immediately so they render, but the scene treats them as uncommitted.

#[cfg(test)]
#[path = "duplicate_test.rs"]
mod duplicate_test;

use crate::consts::GHOST_OPACITY;
use crate::entity::EntityId;
use crate::geom::Point;
use crate::scene::Scene;
use crate::snap::snap_point;

/// An in-progress duplicate-drag.
#[derive(Debug, Clone)]
pub struct Duplication {
    pressed: EntityId,
    start: Point,
    /// `(source, ghost)` pairs.
    pairs: Vec<(EntityId, EntityId)>,
}

impl Duplication {
    #[must_use]
    pub fn new(pressed: EntityId, start: Point) -> Self {
        Self { pressed, start, pairs: Vec::new() }
    }

    #[must_use]
    pub fn pressed(&self) -> EntityId {
        self.pressed
    }

    /// Ghost ids in creation order.
    #[must_use]
    pub fn ghosts(&self) -> Vec<EntityId> {
        self.pairs.iter().map(|(_, g)| *g).collect()
    }

    /// Track the pointer. Creates the ghost set on first call, then moves
    /// each ghost to its source position plus the snapped pointer delta.
    pub fn update(&mut self, scene: &mut Scene, pointer: Point, pitch: f64) {
        let delta = snap_point(pointer - self.start, pitch);

        if self.pairs.is_empty() {
            self.spawn_ghosts(scene);
        }

        let mut orphans = Vec::new();
        for (source, ghost) in &self.pairs {
            let Some(origin) = scene.get(source).map(|e| e.pos) else {
                orphans.push(*ghost);
                continue;
            };
            if let Some(g) = scene.get_mut(ghost) {
                g.move_to(origin + delta, pitch);
            }
        }

        // A source deleted mid-drag takes its ghost with it.
        for ghost in orphans {
            scene.remove(&ghost);
            self.pairs.retain(|(_, g)| *g != ghost);
            tracing::debug!(%ghost, "dropped ghost of vanished source");
        }
    }

    fn spawn_ghosts(&mut self, scene: &mut Scene) {
        let mut sources: Vec<EntityId> =
            scene.selected_ids().into_iter().filter(|id| scene.get(id).is_some_and(|e| !e.ghost)).collect();
        if !sources.contains(&self.pressed) && scene.contains(&self.pressed) {
            sources.push(self.pressed);
        }

        for source in sources {
            let Some(original) = scene.get(&source) else {
                continue;
            };
            let mut ghost = original.duplicate();
            ghost.ghost = true;
            ghost.opacity = GHOST_OPACITY;
            self.pairs.push((source, ghost.id));
            scene.insert(ghost);
        }
        tracing::debug!(count = self.pairs.len(), "duplicate drag started");
    }

    /// Promote every ghost to a committed, selected entity.
    ///
    /// The previous selection is cleared first. Returns the promoted ids; empty
    /// if the pointer never moved, in which case the selection is untouched.
    pub fn commit(self, scene: &mut Scene) -> Vec<EntityId> {
        if self.pairs.is_empty() {
            return Vec::new();
        }
        scene.clear_selection();
        let mut promoted = Vec::with_capacity(self.pairs.len());
        for (_, ghost) in self.pairs {
            if let Some(g) = scene.get_mut(&ghost) {
                g.ghost = false;
                g.opacity = 1.0;
                g.selected = true;
                promoted.push(ghost);
            }
        }
        tracing::info!(count = promoted.len(), "duplicated entities");
        promoted
    }

    /// Discard every ghost without committing anything.
    pub fn abort(self, scene: &mut Scene) {
        for (_, ghost) in self.pairs {
            scene.remove(&ghost);
        }
    }
}
