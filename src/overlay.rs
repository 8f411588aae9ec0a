//! Transient texture overlays ("Scale: 1.1x", "Offset: ...", "Rotation: ...").
//!
//! Scale and rotation overlays are debounced: every change pushes the hide
//! deadline out by the configured duration. The offset overlay has no timer;
//! it stays up for the whole texture drag. The host drives time through
//! [`Overlays::tick`].

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use std::collections::HashMap;

use crate::entity::EntityId;
use crate::texture::TextureMapping;

/// Which overlays are showing on one entity.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overlay {
    pub scale: bool,
    pub offset: bool,
    pub rotation: bool,
    /// Timestamp (ms) at which the timed overlays hide.
    pub hide_at: Option<f64>,
}

impl Overlay {
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.scale || self.offset || self.rotation
    }

    /// Text of each visible overlay, top to bottom.
    #[must_use]
    pub fn lines(&self, mapping: &TextureMapping) -> Vec<String> {
        let mut lines = Vec::new();
        if self.scale {
            lines.push(format!("Scale: {}x", mapping.scale));
        }
        if self.offset {
            lines.push(format!("Offset: x={:.1}, y={:.1}", mapping.offset.x, mapping.offset.y));
        }
        if self.rotation {
            lines.push(format!("Rotation: {:.1}\u{b0}", mapping.rotation));
        }
        lines
    }
}

/// Overlay state for every entity that currently shows one.
#[derive(Debug, Clone)]
pub struct Overlays {
    map: HashMap<EntityId, Overlay>,
    duration_ms: f64,
}

impl Overlays {
    #[must_use]
    pub fn new(duration_ms: f64) -> Self {
        Self { map: HashMap::new(), duration_ms }
    }

    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&Overlay> {
        self.map.get(id).filter(|o| o.is_visible())
    }

    /// Show the scale overlay and restart the hide timer.
    pub fn show_scale(&mut self, id: EntityId, now_ms: f64) {
        let duration = self.duration_ms;
        let o = self.map.entry(id).or_default();
        o.scale = true;
        o.hide_at = Some(now_ms + duration);
    }

    /// Show the rotation overlay and restart the hide timer.
    pub fn show_rotation(&mut self, id: EntityId, now_ms: f64) {
        let duration = self.duration_ms;
        let o = self.map.entry(id).or_default();
        o.rotation = true;
        o.hide_at = Some(now_ms + duration);
    }

    /// Show the offset overlay until [`Overlays::hide_offset`].
    pub fn show_offset(&mut self, id: EntityId) {
        self.map.entry(id).or_default().offset = true;
    }

    pub fn hide_offset(&mut self, id: &EntityId) {
        if let Some(o) = self.map.get_mut(id) {
            o.offset = false;
        }
        self.prune(id);
    }

    pub fn hide_rotation(&mut self, id: &EntityId) {
        if let Some(o) = self.map.get_mut(id) {
            o.rotation = false;
        }
        self.prune(id);
    }

    /// Hide overlays whose deadline has passed. Returns the entities that changed.
    ///
    /// Expiry clears every flag on the entity, the offset overlay included.
    pub fn tick(&mut self, now_ms: f64) -> Vec<EntityId> {
        let expired: Vec<EntityId> = self
            .map
            .iter()
            .filter(|(_, o)| o.hide_at.is_some_and(|t| now_ms >= t))
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.map.remove(id);
        }
        expired
    }

    /// Forget an entity entirely, e.g. after deletion.
    pub fn remove(&mut self, id: &EntityId) {
        self.map.remove(id);
    }

    fn prune(&mut self, id: &EntityId) {
        if self.map.get(id).is_some_and(|o| !o.is_visible()) {
            self.map.remove(id);
        }
    }
}
