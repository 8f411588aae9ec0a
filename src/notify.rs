//! Change notifications: "this entity mutated", delivered to bound listeners.
//!
//! Each entity has one channel. Listeners (property panels, the layer list)
//! connect to the channel of the entity they display. Emitting queues the
//! change together with a [`SceneHandle`]; draining resolves subscribers at
//! that point and silently drops changes whose scene or entity is gone.
//!
//! The raw bus stacks connections: connecting twice delivers twice.
//! [`PanelBinding`] is the safe way to follow a selection, since it always
//! disconnects before connecting.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::collections::HashMap;

use crate::entity::EntityId;
use crate::scene::{Scene, SceneHandle};

/// Identifies one listener (panel instance).
pub type ListenerId = u64;

/// A change delivered to one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub listener: ListenerId,
    pub entity: EntityId,
}

/// Per-entity subscriber lists plus the queue of pending changes.
#[derive(Debug, Default)]
pub struct ChangeBus {
    subscribers: HashMap<EntityId, Vec<ListenerId>>,
    pending: Vec<(EntityId, SceneHandle)>,
    next_listener: ListenerId,
}

impl ChangeBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh listener id.
    pub fn register_listener(&mut self) -> ListenerId {
        self.next_listener += 1;
        self.next_listener
    }

    /// Subscribe `listener` to `entity`'s channel.
    pub fn connect(&mut self, entity: EntityId, listener: ListenerId) {
        self.subscribers.entry(entity).or_default().push(listener);
    }

    /// Remove every connection of `listener` to `entity`.
    ///
    /// Returns whether anything was connected. Disconnecting a listener that
    /// was never connected is a no-op.
    pub fn disconnect(&mut self, entity: EntityId, listener: ListenerId) -> bool {
        let Some(subs) = self.subscribers.get_mut(&entity) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|l| *l != listener);
        let removed = subs.len() != before;
        if subs.is_empty() {
            self.subscribers.remove(&entity);
        }
        removed
    }

    /// Number of live connections on `entity`'s channel.
    #[must_use]
    pub fn connection_count(&self, entity: &EntityId) -> usize {
        self.subscribers.get(entity).map_or(0, Vec::len)
    }

    /// Queue a change of `entity`, owned by `scene`.
    pub fn emit(&mut self, entity: EntityId, scene: &Scene) {
        self.pending.push((entity, scene.handle()));
    }

    /// Whether changes are waiting to be drained.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Resolve queued changes into per-listener notifications.
    ///
    /// Changes queued against a scene that no longer exists, or for entities
    /// no longer in `scene`, are dropped.
    pub fn drain(&mut self, scene: &Scene) -> Vec<Notification> {
        let mut out = Vec::new();
        for (entity, handle) in std::mem::take(&mut self.pending) {
            if !handle.is_alive() {
                tracing::debug!(%entity, "dropping change for torn-down scene");
                continue;
            }
            if !scene.contains(&entity) {
                continue;
            }
            if let Some(subs) = self.subscribers.get(&entity) {
                out.extend(subs.iter().map(|&listener| Notification { listener, entity }));
            }
        }
        out
    }

    /// Drop every subscription on `entity`'s channel, e.g. after deletion.
    pub fn forget(&mut self, entity: &EntityId) {
        self.subscribers.remove(entity);
    }
}

/// A listener that follows one entity at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelBinding {
    listener: ListenerId,
    tracked: Option<EntityId>,
}

impl PanelBinding {
    /// Register a new listener on `bus`, initially unbound.
    pub fn new(bus: &mut ChangeBus) -> Self {
        Self { listener: bus.register_listener(), tracked: None }
    }

    #[must_use]
    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    #[must_use]
    pub fn tracked(&self) -> Option<EntityId> {
        self.tracked
    }

    /// Follow `entity`, leaving exactly one connection to it.
    ///
    /// The previous entity is disconnected first, and `entity` itself is
    /// disconnected before connecting, so rebinding the same entity never stacks.
    pub fn bind(&mut self, bus: &mut ChangeBus, entity: EntityId) {
        if let Some(prev) = self.tracked {
            bus.disconnect(prev, self.listener);
        }
        bus.disconnect(entity, self.listener);
        bus.connect(entity, self.listener);
        self.tracked = Some(entity);
    }

    /// Stop following anything.
    pub fn unbind(&mut self, bus: &mut ChangeBus) {
        if let Some(prev) = self.tracked.take() {
            bus.disconnect(prev, self.listener);
        }
    }
}
