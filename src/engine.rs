//! Engine: gesture dispatch, the entity mutator API, and the browser wrapper.
//!
//! `EngineCore` is the testable half. It owns the scene, camera, gesture
//! state, change bus and overlays, and every handler returns the list of
//! [`Action`]s the host should react to. `Engine` wraps it together with
//! the `<canvas>` element and does nothing but delegate and draw.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::consts::{WHEEL_NOTCH_PX, ZOOM_FACTOR};
use crate::duplicate::Duplication;
use crate::entity::{
    Entity, EntityData, EntityId, EntityKind, Geometry, PortalRole, SurfaceType, WeaponType, enforce_min_size,
};
use crate::geom::{self, Point, Rect};
use crate::hit::HitPart;
use crate::input::{Button, DropPayload, InputState, Key, Modifiers, WheelDelta};
use crate::notify::{ChangeBus, ListenerId, Notification, PanelBinding};
use crate::overlay::Overlays;
use crate::render::{self, TextureCache};
use crate::scene::{LayerEntry, Scene};
use crate::snap::snap_point;
use crate::texture::{self, FsTextureLoader, TextureImage, TextureLoader};

/// Side effects the host should perform after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    EntityCreated(EntityId),
    EntityUpdated(EntityId),
    EntityDeleted(EntityId),
    /// The selection set changed; panels should rebind.
    SelectionChanged,
    /// CSS cursor name for the canvas element.
    SetCursor(String),
    RenderNeeded,
    /// The scene bounds grew or shrank; scrollbars should follow.
    BoundsChanged(Rect),
}

/// Errors from the entity mutator API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("entity not found: {0}")]
    NotFound(EntityId),
    #[error("{operation} is not supported on {kind} entity {id}")]
    Unsupported { id: EntityId, kind: &'static str, operation: &'static str },
    #[error("unknown panel listener: {0}")]
    UnknownListener(ListenerId),
}

/// Entries of an entity's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextCommand {
    ToggleWall,
    MoveToFront,
    MoveToBack,
    Delete,
}

impl ContextCommand {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ToggleWall => "Toggle wall",
            Self::MoveToFront => "Move to front",
            Self::MoveToBack => "Move to back",
            Self::Delete => "Delete",
        }
    }
}

/// An image drawn behind the map: the viewport-fixed sky, or the scene overlay.
#[derive(Debug, Clone)]
pub struct Backdrop {
    pub path: String,
    /// `None` when the path failed to load.
    pub image: Option<TextureImage>,
}

// =============================================================================
// ENGINE CORE
// =============================================================================

/// Testable editor state. No browser types.
pub struct EngineCore {
    pub scene: Scene,
    pub camera: Camera,
    pub config: EditorConfig,
    pub input: InputState,
    pub bus: ChangeBus,
    pub overlays: Overlays,
    /// Viewport size in CSS pixels.
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    loader: Box<dyn TextureLoader>,
    panels: HashMap<ListenerId, PanelBinding>,
    map_file: Option<PathBuf>,
    sky: Option<Backdrop>,
    overlay_image: Option<Backdrop>,
    now_ms: f64,
    cursor: String,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            scene: Scene::with_min_canvas(config.min_canvas_width, config.min_canvas_height),
            camera: Camera::default(),
            config,
            input: InputState::Idle,
            bus: ChangeBus::new(),
            overlays: Overlays::new(config.overlay_ms),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            loader: Box::new(FsTextureLoader),
            panels: HashMap::new(),
            map_file: None,
            sky: None,
            overlay_image: None,
            now_ms: 0.0,
            cursor: "default".into(),
        }
    }

    /// Replace the texture loader.
    #[must_use]
    pub fn with_loader(mut self, loader: Box<dyn TextureLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
    }

    /// Map definition file that relative texture paths resolve against.
    pub fn set_map_file(&mut self, path: Option<PathBuf>) {
        self.map_file = path;
    }

    /// Viewport-fixed sky image, scaled to the viewport width. `None` removes it.
    pub fn set_sky_image(&mut self, path: Option<String>) -> Vec<Action> {
        self.sky = path.map(|p| self.backdrop(p));
        tracing::debug!(loaded = self.sky.as_ref().is_some_and(|b| b.image.is_some()), "sky image set");
        vec![Action::RenderNeeded]
    }

    /// Image drawn at the scene origin beneath the grid. `None` removes it.
    pub fn set_overlay_image(&mut self, path: Option<String>) -> Vec<Action> {
        self.overlay_image = path.map(|p| self.backdrop(p));
        tracing::debug!(loaded = self.overlay_image.as_ref().is_some_and(|b| b.image.is_some()), "overlay image set");
        vec![Action::RenderNeeded]
    }

    #[must_use]
    pub fn sky_image(&self) -> Option<&Backdrop> {
        self.sky.as_ref()
    }

    #[must_use]
    pub fn overlay_image(&self) -> Option<&Backdrop> {
        self.overlay_image.as_ref()
    }

    fn backdrop(&self, path: String) -> Backdrop {
        let image = self.load_texture(&path);
        Backdrop { path, image }
    }

    #[must_use]
    pub fn visible_rect(&self) -> Rect {
        self.camera.visible_rect(self.viewport_width, self.viewport_height)
    }

    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    #[must_use]
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    // --- Queries ---

    #[must_use]
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.scene.get(id)
    }

    #[must_use]
    pub fn selection(&self) -> Vec<EntityId> {
        self.scene.selected_ids()
    }

    #[must_use]
    pub fn layers(&self) -> Vec<LayerEntry> {
        self.scene.layers()
    }

    /// Context menu entries available for `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the scene.
    pub fn context_commands(&self, id: &EntityId) -> Result<Vec<ContextCommand>, EditError> {
        let entity = self.scene.get(id).ok_or(EditError::NotFound(*id))?;
        Ok(match entity.kind() {
            EntityKind::Rect => vec![
                ContextCommand::ToggleWall,
                ContextCommand::MoveToFront,
                ContextCommand::MoveToBack,
                ContextCommand::Delete,
            ],
            EntityKind::Triangle => {
                vec![ContextCommand::MoveToFront, ContextCommand::MoveToBack, ContextCommand::Delete]
            }
            _ => vec![ContextCommand::Delete],
        })
    }

    /// Run a context menu entry on `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing entity and `Unsupported` when the
    /// command is not offered for its kind.
    pub fn run_context_command(&mut self, id: EntityId, command: ContextCommand) -> Result<Vec<Action>, EditError> {
        if !self.context_commands(&id)?.contains(&command) {
            return Err(self.unsupported(id, command.label()));
        }
        match command {
            ContextCommand::ToggleWall => self.toggle_wall(id),
            ContextCommand::MoveToFront => self.raise_to_front(id),
            ContextCommand::MoveToBack => self.send_to_back(id),
            ContextCommand::Delete => self.delete_command(id),
        }
    }

    // --- Change notification ---

    /// Create a panel that follows one entity at a time.
    pub fn register_panel(&mut self) -> ListenerId {
        let binding = PanelBinding::new(&mut self.bus);
        let listener = binding.listener();
        self.panels.insert(listener, binding);
        listener
    }

    /// Point a panel at `entity`, replacing whatever it tracked.
    ///
    /// # Errors
    ///
    /// Returns `UnknownListener` for an unregistered panel and `NotFound` for a missing entity.
    pub fn bind_panel(&mut self, listener: ListenerId, entity: EntityId) -> Result<(), EditError> {
        if !self.scene.contains(&entity) {
            return Err(EditError::NotFound(entity));
        }
        let binding = self.panels.get_mut(&listener).ok_or(EditError::UnknownListener(listener))?;
        binding.bind(&mut self.bus, entity);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `UnknownListener` for an unregistered panel.
    pub fn unbind_panel(&mut self, listener: ListenerId) -> Result<(), EditError> {
        let binding = self.panels.get_mut(&listener).ok_or(EditError::UnknownListener(listener))?;
        binding.unbind(&mut self.bus);
        Ok(())
    }

    /// Entity a panel currently tracks.
    #[must_use]
    pub fn panel_entity(&self, listener: ListenerId) -> Option<EntityId> {
        self.panels.get(&listener).and_then(PanelBinding::tracked)
    }

    /// Deliver pending changes to their current subscribers.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.bus.drain(&self.scene)
    }

    fn changed(&mut self, id: EntityId) {
        self.bus.emit(id, &self.scene);
    }

    /// Unbind every panel whose tracked entity matches `stale`.
    fn release_panels(&mut self, stale: impl Fn(EntityId) -> bool) {
        for binding in self.panels.values_mut() {
            if binding.tracked().is_some_and(&stale) {
                binding.unbind(&mut self.bus);
            }
        }
    }

    // --- Scene lifecycle ---

    /// Replace the scene content with `entities`, loading their textures.
    pub fn load_snapshot(&mut self, entities: Vec<Entity>) {
        self.input = InputState::Idle;
        self.overlays = Overlays::new(self.config.overlay_ms);
        self.release_panels(|_| true);
        self.scene.load(entities);
        let textured: Vec<(EntityId, String)> = self
            .scene
            .committed()
            .filter_map(|e| e.texture().and_then(|t| t.path.clone()).map(|p| (e.id, p)))
            .collect();
        for (id, path) in textured {
            let image = self.load_texture(&path);
            if let Some(t) = self.scene.get_mut(&id).and_then(Entity::texture_mut) {
                t.image = image;
            }
        }
        tracing::info!(count = self.scene.len(), "scene loaded");
    }

    /// Committed entities in draw order, without ghosts.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Entity> {
        self.scene.sorted().into_iter().filter(|e| !e.ghost).cloned().collect()
    }

    /// Drop the current scene. Changes emitted against it are never delivered.
    pub fn close_scene(&mut self) {
        self.scene = Scene::with_min_canvas(self.config.min_canvas_width, self.config.min_canvas_height);
        self.input = InputState::Idle;
        self.overlays = Overlays::new(self.config.overlay_ms);
        self.release_panels(|_| true);
        tracing::info!("scene closed");
    }

    /// Advance the overlay clock.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        self.now_ms = now_ms;
        if self.overlays.tick(now_ms).is_empty() { Vec::new() } else { vec![Action::RenderNeeded] }
    }

    // =========================================================================
    // POINTER EVENTS
    // =========================================================================

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.input.is_idle() {
            actions.extend(self.finish_gesture(modifiers));
        }

        if button == Button::Middle {
            self.input = InputState::Panning { last_screen: screen_pt };
            actions.extend(self.set_cursor("grabbing"));
            return actions;
        }

        let before = self.scene.selected_ids();
        let scene_pt = self.camera.screen_to_scene(screen_pt);
        let Some(hit) = self.scene.hit_test(scene_pt, self.config.edge_margin, self.config.point_radius) else {
            if button == Button::Primary && !modifiers.command() && self.scene.clear_selection() {
                actions.push(Action::SelectionChanged);
                actions.push(Action::RenderNeeded);
            }
            return actions;
        };
        let id = hit.entity_id;

        let toggled = modifiers.command();
        if toggled {
            let select = !self.scene.is_selected(&id);
            if self.scene.set_selected(&id, select) == Some(true) {
                self.changed(id);
            }
        }

        if button == Button::Primary {
            let next = match hit.part {
                HitPart::ResizeZone(zone) => self.scene.get(&id).and_then(|e| {
                    e.local_rect().map(|orig_rect| InputState::Resizing {
                        id,
                        zone,
                        start_local: e.to_local(scene_pt),
                        orig_rect,
                    })
                }),
                HitPart::Vertex(index) => self
                    .scene
                    .get(&id)
                    .and_then(|e| e.triangle_points().map(|orig| InputState::MovingVertex { id, index, orig })),
                HitPart::Body => None,
            };
            let next = match next {
                Some(state) => state,
                None => self.body_gesture(id, scene_pt, modifiers),
            };
            tracing::debug!(%id, gesture = next.name(), "gesture started");
            self.input = next;
        }

        if before != self.scene.selected_ids() {
            actions.push(Action::SelectionChanged);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Pick the body-press gesture from the modifiers.
    fn body_gesture(&mut self, id: EntityId, scene_pt: Point, modifiers: Modifiers) -> InputState {
        let Some(entity) = self.scene.get(&id) else {
            return InputState::Idle;
        };
        let center = entity.to_scene(entity.local_center());
        let texture = entity.texture().map(|t| (t.offset, t.rotation));

        if modifiers.command()
            && let Some((orig_offset, _)) = texture
        {
            self.overlays.show_offset(id);
            return InputState::DraggingTexture { id, start_scene: scene_pt, orig_offset };
        }
        if modifiers.shift {
            return InputState::Duplicating(Duplication::new(id, scene_pt));
        }
        if modifiers.alt
            && let Some((_, orig_rotation)) = texture
        {
            self.overlays.show_rotation(id, self.now_ms);
            return InputState::Rotating { id, center, start_scene: scene_pt, orig_rotation };
        }
        self.default_move(id, scene_pt, modifiers.command())
    }

    fn default_move(&mut self, id: EntityId, scene_pt: Point, command: bool) -> InputState {
        let was_selected = self.scene.is_selected(&id);
        if !command && !was_selected && self.scene.select_only(&id) == Some(true) {
            self.changed(id);
        }
        let mut origins: Vec<(EntityId, Point)> = self
            .scene
            .selected_ids()
            .into_iter()
            .filter_map(|sid| self.scene.get(&sid).map(|e| (sid, e.pos)))
            .collect();
        if !origins.iter().any(|(o, _)| *o == id)
            && let Some(e) = self.scene.get(&id)
        {
            origins.push((id, e.pos));
        }
        InputState::DefaultMove { id, start_scene: scene_pt, origins, moved: false, dragged: false, was_selected }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let scene_pt = self.camera.screen_to_scene(screen_pt);
        let pitch = self.config.grid_size;
        let mut actions = Vec::new();
        let mut state = std::mem::take(&mut self.input);

        match &mut state {
            InputState::Idle => return self.hover(scene_pt),
            InputState::Panning { last_screen } => {
                let d = screen_pt - *last_screen;
                *last_screen = screen_pt;
                self.camera.pan_by(d.x, d.y);
                if self.scene.extend_for_viewport(self.visible_rect()) {
                    actions.push(Action::BoundsChanged(self.scene.bounds()));
                }
            }
            InputState::DefaultMove { start_scene, origins, moved, dragged, .. } => {
                let delta = scene_pt - *start_scene;
                if scene_pt != *start_scene {
                    *dragged = true;
                }
                for (eid, origin) in origins.iter() {
                    let changed = self.scene.get_mut(eid).is_some_and(|e| e.move_to(*origin + delta, pitch));
                    if changed {
                        *moved = true;
                        self.changed(*eid);
                    }
                }
            }
            InputState::Resizing { id, zone, start_local, orig_rect } => {
                if let Some(e) = self.scene.get_mut(id) {
                    let diff = e.to_local(scene_pt) - *start_local;
                    e.geometry = Geometry::Rect(zone.apply(*orig_rect, diff, pitch));
                }
            }
            InputState::MovingVertex { id, index, .. } => {
                if let Some(e) = self.scene.get_mut(id) {
                    let local = snap_point(e.to_local(scene_pt), pitch);
                    if let Geometry::Triangle { points } = &mut e.geometry
                        && let Some(p) = points.get_mut(*index)
                    {
                        *p = local;
                    }
                }
            }
            InputState::DraggingTexture { id, start_scene, orig_offset } => {
                let raw = scene_pt - *start_scene;
                let d = if modifiers.precision() { raw } else { snap_point(raw, pitch) };
                if let Some(t) = self.scene.get_mut(id).and_then(Entity::texture_mut) {
                    t.offset = *orig_offset + d;
                }
            }
            InputState::Duplicating(dup) => dup.update(&mut self.scene, scene_pt, pitch),
            InputState::Rotating { id, center, start_scene, orig_rotation } => {
                let swept = geom::angle_deg(*center, scene_pt) - geom::angle_deg(*center, *start_scene);
                let rotation = texture::snap_rotation(*orig_rotation + swept, modifiers.precision());
                if let Some(t) = self.scene.get_mut(id).and_then(Entity::texture_mut) {
                    t.rotation = rotation;
                }
                self.overlays.show_rotation(*id, self.now_ms);
            }
        }

        self.input = state;
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Idle pointer feedback over resize zones and vertices.
    fn hover(&mut self, scene_pt: Point) -> Vec<Action> {
        let part = self.scene.hit_test(scene_pt, self.config.edge_margin, self.config.point_radius).map(|h| h.part);
        let cursor = match part {
            Some(HitPart::ResizeZone(zone)) => zone.cursor(),
            Some(HitPart::Vertex(_)) => "move",
            _ => "default",
        };
        self.set_cursor(cursor).into_iter().collect()
    }

    fn set_cursor(&mut self, cursor: &str) -> Option<Action> {
        if self.cursor == cursor {
            return None;
        }
        self.cursor = cursor.to_string();
        Some(Action::SetCursor(self.cursor.clone()))
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } if button == Button::Middle => self.end_pan(),
            InputState::Panning { .. } => Vec::new(),
            _ if button == Button::Primary => self.finish_gesture(modifiers),
            _ => Vec::new(),
        }
    }

    fn end_pan(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        let mut actions: Vec<Action> = self.set_cursor("default").into_iter().collect();
        if self.scene.shrink_to_content(self.visible_rect()) {
            actions.push(Action::BoundsChanged(self.scene.bounds()));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Complete the active gesture the way a primary release does.
    fn finish_gesture(&mut self, modifiers: Modifiers) -> Vec<Action> {
        let before = self.scene.selected_ids();
        let mut actions = Vec::new();
        let state = std::mem::take(&mut self.input);
        tracing::debug!(gesture = state.name(), "gesture finished");

        match state {
            InputState::Idle => return actions,
            InputState::Panning { .. } => return self.end_pan(),
            InputState::DefaultMove { id, origins, moved, dragged, was_selected, .. } => {
                if moved {
                    actions.extend(origins.into_iter().map(|(eid, _)| Action::EntityUpdated(eid)));
                }
                if !dragged && was_selected && !modifiers.command() && self.scene.select_only(&id) == Some(true) {
                    self.changed(id);
                }
            }
            InputState::Resizing { id, .. } => {
                self.changed(id);
                actions.push(Action::EntityUpdated(id));
            }
            InputState::MovingVertex { id, .. } => {
                let pitch = self.config.grid_size;
                if let Some(e) = self.scene.get_mut(&id) {
                    e.snap_vertices(pitch);
                }
                self.changed(id);
                actions.push(Action::EntityUpdated(id));
            }
            InputState::DraggingTexture { id, .. } => {
                self.overlays.hide_offset(&id);
                self.changed(id);
                actions.push(Action::EntityUpdated(id));
            }
            InputState::Duplicating(dup) => {
                let pressed = dup.pressed();
                let promoted = dup.commit(&mut self.scene);
                if !promoted.is_empty() {
                    for ghost in &promoted {
                        self.changed(*ghost);
                        actions.push(Action::EntityCreated(*ghost));
                    }
                    self.changed(pressed);
                }
            }
            InputState::Rotating { id, .. } => {
                self.overlays.hide_rotation(&id);
                self.changed(id);
                actions.push(Action::EntityUpdated(id));
            }
        }

        if before != self.scene.selected_ids() {
            actions.push(Action::SelectionChanged);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Cancel the active gesture, restoring press-time state.
    fn abort_gesture(&mut self) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        tracing::debug!(gesture = state.name(), "gesture aborted");

        match state {
            InputState::Idle => return Vec::new(),
            InputState::Panning { .. } => return self.end_pan(),
            InputState::DefaultMove { origins, .. } => {
                for (id, origin) in origins {
                    let restored = self.scene.get_mut(&id).is_some_and(|e| {
                        let moved = e.pos != origin;
                        e.pos = origin;
                        moved
                    });
                    if restored {
                        self.changed(id);
                    }
                }
            }
            InputState::Resizing { id, orig_rect, .. } => {
                if let Some(e) = self.scene.get_mut(&id) {
                    e.geometry = Geometry::Rect(orig_rect);
                }
            }
            InputState::MovingVertex { id, orig, .. } => {
                if let Some(e) = self.scene.get_mut(&id) {
                    e.geometry = Geometry::Triangle { points: orig };
                }
            }
            InputState::DraggingTexture { id, orig_offset, .. } => {
                if let Some(t) = self.scene.get_mut(&id).and_then(Entity::texture_mut) {
                    t.offset = orig_offset;
                }
                self.overlays.hide_offset(&id);
            }
            InputState::Duplicating(dup) => dup.abort(&mut self.scene),
            InputState::Rotating { id, orig_rotation, .. } => {
                if let Some(t) = self.scene.get_mut(&id).and_then(Entity::texture_mut) {
                    t.rotation = orig_rotation;
                }
                self.overlays.hide_rotation(&id);
            }
        }
        vec![Action::RenderNeeded]
    }

    // =========================================================================
    // WHEEL / KEYS / DROP
    // =========================================================================

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if !self.input.is_idle() {
            return Vec::new();
        }
        let notches = -delta.dy / WHEEL_NOTCH_PX;

        if modifiers.command() {
            let scene_pt = self.camera.screen_to_scene(screen_pt);
            return match self.scene.hit_test(scene_pt, self.config.edge_margin, self.config.point_radius) {
                Some(hit) => self.wheel_entity(hit.entity_id, notches, modifiers.precision()),
                None => Vec::new(),
            };
        }

        if modifiers.alt {
            let raw = if delta.dy == 0.0 { delta.dx } else { delta.dy };
            if raw == 0.0 {
                return Vec::new();
            }
            let factor = if raw < 0.0 { ZOOM_FACTOR } else { 1.0 / ZOOM_FACTOR };
            let anchor = Point::new(self.viewport_width / 2.0, self.viewport_height / 2.0);
            self.camera.zoom_about(anchor, factor);
            return vec![Action::RenderNeeded];
        }

        self.camera.pan_by(-delta.dx, -delta.dy);
        let mut actions = Vec::new();
        if self.scene.extend_for_viewport(self.visible_rect()) {
            actions.push(Action::BoundsChanged(self.scene.bounds()));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Ctrl+wheel over an entity: texture scale, or jump-pad rotation.
    ///
    /// The wheeled entity becomes the only selection first, so bound panels follow it.
    fn wheel_entity(&mut self, id: EntityId, notches: f64, fine: bool) -> Vec<Action> {
        let wheelable = self
            .scene
            .get(&id)
            .is_some_and(|e| matches!(e.data, EntityData::Rect(_) | EntityData::Triangle(_) | EntityData::JumpPad(_)));
        if !wheelable {
            return Vec::new();
        }

        let before = self.scene.selected_ids();
        if self.scene.select_only(&id) == Some(true) {
            self.changed(id);
        }

        let Some(e) = self.scene.get_mut(&id) else {
            return Vec::new();
        };
        match &mut e.data {
            EntityData::Rect(shape) | EntityData::Triangle(shape) => {
                shape.texture.scale = texture::step_scale(shape.texture.scale, notches, fine);
                self.overlays.show_scale(id, self.now_ms);
            }
            EntityData::JumpPad(_) => {
                e.rotation = texture::step_jump_pad_rotation(e.rotation, notches, fine);
            }
            _ => return Vec::new(),
        }
        self.changed(id);

        let mut actions = Vec::new();
        if before != self.scene.selected_ids() {
            actions.push(Action::SelectionChanged);
        }
        actions.push(Action::EntityUpdated(id));
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if key.is("Escape") {
            return self.abort_gesture();
        }
        if !self.input.is_idle() {
            return Vec::new();
        }
        if key.is("Delete") || key.is("Backspace") {
            return self.remove_selected();
        }
        if modifiers.command() && key.is("a") {
            return self.select_all();
        }
        Vec::new()
    }

    /// Whether dropping `payload` at `screen_pt` would retexture something.
    #[must_use]
    pub fn accepts_drop(&self, screen_pt: Point, payload: &DropPayload) -> bool {
        payload.is_acceptable() && self.texturable_at(screen_pt).is_some()
    }

    /// Retexture the topmost rect or triangle under `screen_pt`.
    pub fn on_drop(&mut self, screen_pt: Point, payload: &DropPayload) -> Vec<Action> {
        let Some(path) = payload.path().filter(|p| texture::is_image_path(p)) else {
            tracing::warn!(?payload, "drop rejected: not an image path");
            return Vec::new();
        };
        let Some(id) = self.texturable_at(screen_pt) else {
            return Vec::new();
        };

        let before = self.scene.selected_ids();
        if self.scene.select_only(&id) == Some(true) {
            self.changed(id);
        }
        let image = self.load_texture(&path);
        if let Some(t) = self.scene.get_mut(&id).and_then(Entity::texture_mut) {
            t.reset_to(path, image);
        }
        self.changed(id);

        let mut actions = Vec::new();
        if before != self.scene.selected_ids() {
            actions.push(Action::SelectionChanged);
        }
        actions.push(Action::EntityUpdated(id));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn texturable_at(&self, screen_pt: Point) -> Option<EntityId> {
        let scene_pt = self.camera.screen_to_scene(screen_pt);
        self.scene
            .sorted()
            .into_iter()
            .rev()
            .find(|e| !e.ghost && e.is_texturable() && e.contains(scene_pt))
            .map(|e| e.id)
    }

    fn load_texture(&self, path: &str) -> Option<TextureImage> {
        let resolved = match &self.map_file {
            Some(map_file) => texture::resolve_texture_path(path, map_file)?,
            None => Path::new(path).to_path_buf(),
        };
        texture::load_or_none(self.loader.as_ref(), &resolved.to_string_lossy())
    }

    // =========================================================================
    // MUTATORS
    // =========================================================================

    /// Insert an entity at its intercepted position.
    pub fn add_entity(&mut self, mut entity: Entity) -> Vec<Action> {
        entity.pos = entity.intercept_position(entity.pos, self.config.grid_size);
        let id = entity.id;
        let path = entity.texture().filter(|t| t.image.is_none()).and_then(|t| t.path.clone());
        if let Some(path) = path {
            let image = self.load_texture(&path);
            if let Some(t) = entity.texture_mut() {
                t.image = image;
            }
        }
        tracing::debug!(%id, kind = entity.kind().name(), "entity added");
        self.scene.insert(entity);
        self.changed(id);
        vec![Action::EntityCreated(id), Action::RenderNeeded]
    }

    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the scene.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Vec<Action>, EditError> {
        let removed = self.scene.remove(&id).ok_or(EditError::NotFound(id))?;
        self.forget(id);
        let mut actions = vec![Action::EntityDeleted(id)];
        if removed.selected {
            actions.push(Action::SelectionChanged);
        }
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// Delete every selected entity.
    pub fn remove_selected(&mut self) -> Vec<Action> {
        let removed = self.scene.remove_selected();
        self.deleted(removed)
    }

    /// Context-menu delete: the whole selection if `id` is selected, else just `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the scene.
    pub fn delete_command(&mut self, id: EntityId) -> Result<Vec<Action>, EditError> {
        if !self.scene.contains(&id) {
            return Err(EditError::NotFound(id));
        }
        let removed = self.scene.delete_command(&id);
        Ok(self.deleted(removed))
    }

    fn deleted(&mut self, removed: Vec<EntityId>) -> Vec<Action> {
        if removed.is_empty() {
            return Vec::new();
        }
        tracing::info!(count = removed.len(), "entities deleted");
        let mut actions = Vec::with_capacity(removed.len() + 2);
        for id in removed {
            self.forget(id);
            actions.push(Action::EntityDeleted(id));
        }
        actions.push(Action::SelectionChanged);
        actions.push(Action::RenderNeeded);
        actions
    }

    fn forget(&mut self, id: EntityId) {
        self.bus.forget(&id);
        self.overlays.remove(&id);
        self.release_panels(|tracked| tracked == id);
    }

    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the scene.
    pub fn raise_to_front(&mut self, id: EntityId) -> Result<Vec<Action>, EditError> {
        let z = self.scene.raise_to_front(&id).ok_or(EditError::NotFound(id))?;
        tracing::info!(%id, z, "moved to front");
        Ok(self.updated(id))
    }

    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the scene.
    pub fn send_to_back(&mut self, id: EntityId) -> Result<Vec<Action>, EditError> {
        let z = self.scene.send_to_back(&id).ok_or(EditError::NotFound(id))?;
        tracing::info!(%id, z, "moved to back");
        Ok(self.updated(id))
    }

    fn updated(&mut self, id: EntityId) -> Vec<Action> {
        self.changed(id);
        vec![Action::EntityUpdated(id), Action::RenderNeeded]
    }

    fn unsupported(&self, id: EntityId, operation: &'static str) -> EditError {
        match self.scene.get(&id) {
            Some(e) => EditError::Unsupported { id, kind: e.kind().name(), operation },
            None => EditError::NotFound(id),
        }
    }

    /// Look up `id`, apply `op`, and emit a change if it reports one.
    ///
    /// `op` returns `None` when the entity's kind doesn't support it.
    fn update_with(
        &mut self,
        id: EntityId,
        operation: &'static str,
        op: impl FnOnce(&mut Entity) -> Option<bool>,
    ) -> Result<Vec<Action>, EditError> {
        let entity = self.scene.get_mut(&id).ok_or(EditError::NotFound(id))?;
        match op(entity) {
            None => Err(self.unsupported(id, operation)),
            Some(false) => Ok(Vec::new()),
            Some(true) => Ok(self.updated(id)),
        }
    }

    /// Flip a rect between `wall` and `static`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for anything but a rect.
    pub fn toggle_wall(&mut self, id: EntityId) -> Result<Vec<Action>, EditError> {
        self.update_with(id, "toggle_wall", |e| match &mut e.data {
            EntityData::Rect(shape) => {
                shape.surface =
                    if shape.surface == SurfaceType::Wall { SurfaceType::Static } else { SurfaceType::Wall };
                Some(true)
            }
            _ => None,
        })
    }

    /// Move an entity, snapping the way an interactive drag does.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the scene.
    pub fn set_position(&mut self, id: EntityId, pos: Point) -> Result<Vec<Action>, EditError> {
        let pitch = self.config.grid_size;
        self.update_with(id, "set_position", |e| Some(e.move_to(pos, pitch)))
    }

    /// Replace a rect's local geometry, clamped to the minimum size.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for anything but a rect.
    pub fn set_rect(&mut self, id: EntityId, rect: Rect) -> Result<Vec<Action>, EditError> {
        let min = self.config.grid_size;
        self.update_with(id, "set_rect", |e| {
            if e.kind() != EntityKind::Rect {
                return None;
            }
            let next = Geometry::Rect(enforce_min_size(rect.normalized(), min));
            let changed = e.geometry != next;
            e.geometry = next;
            Some(changed)
        })
    }

    /// Replace a triangle's vertices.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for anything but a triangle.
    pub fn set_polygon(&mut self, id: EntityId, points: [Point; 3]) -> Result<Vec<Action>, EditError> {
        self.update_with(id, "set_polygon", |e| match &mut e.geometry {
            Geometry::Triangle { points: current } => {
                let changed = *current != points;
                *current = points;
                Some(changed)
            }
            Geometry::Rect(_) => None,
        })
    }

    /// Set the texture transform of a rect or triangle.
    ///
    /// A changed path reloads the image; an absent path clears it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for non-texturable entities.
    pub fn set_texture_mapping(
        &mut self,
        id: EntityId,
        path: Option<String>,
        scale: f64,
        rotation: f64,
        offset: Point,
    ) -> Result<Vec<Action>, EditError> {
        let current = self.scene.get(&id).ok_or(EditError::NotFound(id))?;
        let Some(mapping) = current.texture() else {
            return Err(self.unsupported(id, "set_texture_mapping"));
        };
        let reload = mapping.path != path;
        let image = match (&path, reload) {
            (Some(p), true) => self.load_texture(p),
            (None, _) => None,
            (Some(_), false) => mapping.image.clone(),
        };
        self.update_with(id, "set_texture_mapping", |e| {
            let t = e.texture_mut()?;
            t.path = path;
            t.image = image;
            t.scale = texture::clamp_scale(scale);
            t.rotation = rotation;
            t.offset = offset;
            Some(true)
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for non-texturable entities.
    pub fn set_surface_type(&mut self, id: EntityId, surface: SurfaceType) -> Result<Vec<Action>, EditError> {
        self.update_with(id, "set_surface_type", |e| {
            let shape = e.shape_mut()?;
            let changed = shape.surface != surface;
            shape.surface = surface;
            Some(changed)
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for anything but an item.
    pub fn set_weapon(&mut self, id: EntityId, weapon: WeaponType) -> Result<Vec<Action>, EditError> {
        self.update_with(id, "set_weapon", |e| match &mut e.data {
            EntityData::Item(item) => Some(std::mem::replace(&mut item.weapon, weapon) != weapon),
            _ => None,
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for anything but an item.
    pub fn set_ammo(&mut self, id: EntityId, ammo: u32) -> Result<Vec<Action>, EditError> {
        self.update_with(id, "set_ammo", |e| match &mut e.data {
            EntityData::Item(item) => Some(std::mem::replace(&mut item.ammo, ammo) != ammo),
            _ => None,
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for anything but an item.
    pub fn set_stay(&mut self, id: EntityId, stay: bool) -> Result<Vec<Action>, EditError> {
        self.update_with(id, "set_stay", |e| match &mut e.data {
            EntityData::Item(item) => Some(std::mem::replace(&mut item.stay, stay) != stay),
            _ => None,
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for anything but a jump pad.
    pub fn set_velocity(&mut self, id: EntityId, velocity: Point) -> Result<Vec<Action>, EditError> {
        self.update_with(id, "set_velocity", |e| match &mut e.data {
            EntityData::JumpPad(pad) => Some(std::mem::replace(&mut pad.velocity, velocity) != velocity),
            _ => None,
        })
    }

    /// Set a jump pad's rotation, normalized into (-360, 360].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for anything but a jump pad.
    pub fn set_rotation(&mut self, id: EntityId, degrees: f64) -> Result<Vec<Action>, EditError> {
        let rotation = texture::normalize_rotation(degrees);
        self.update_with(id, "set_rotation", |e| {
            if e.kind() != EntityKind::JumpPad {
                return None;
            }
            Some(std::mem::replace(&mut e.rotation, rotation) != rotation)
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for anything but a portal.
    pub fn set_portal_id(&mut self, id: EntityId, portal_id: u32) -> Result<Vec<Action>, EditError> {
        self.update_with(id, "set_portal_id", |e| match &mut e.data {
            EntityData::Portal(portal) => Some(std::mem::replace(&mut portal.portal_id, portal_id) != portal_id),
            _ => None,
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Unsupported` for anything but a portal.
    pub fn set_portal_role(&mut self, id: EntityId, role: PortalRole) -> Result<Vec<Action>, EditError> {
        self.update_with(id, "set_portal_role", |e| match &mut e.data {
            EntityData::Portal(portal) => Some(std::mem::replace(&mut portal.role, role) != role),
            _ => None,
        })
    }

    // --- Selection ---

    /// Add `id` to the selection.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the scene.
    pub fn select(&mut self, id: EntityId) -> Result<Vec<Action>, EditError> {
        match self.scene.set_selected(&id, true) {
            None => Err(EditError::NotFound(id)),
            Some(false) => Ok(Vec::new()),
            Some(true) => {
                self.changed(id);
                Ok(vec![Action::SelectionChanged, Action::RenderNeeded])
            }
        }
    }

    /// Make `id` the only selected entity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the scene.
    pub fn select_only(&mut self, id: EntityId) -> Result<Vec<Action>, EditError> {
        let before = self.scene.selected_ids();
        if self.scene.select_only(&id).ok_or(EditError::NotFound(id))? {
            self.changed(id);
        }
        if before == self.scene.selected_ids() {
            return Ok(Vec::new());
        }
        Ok(vec![Action::SelectionChanged, Action::RenderNeeded])
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        if self.scene.clear_selection() { vec![Action::SelectionChanged, Action::RenderNeeded] } else { Vec::new() }
    }

    pub fn select_all(&mut self) -> Vec<Action> {
        let newly = self.scene.select_all();
        if newly.is_empty() {
            return Vec::new();
        }
        for id in newly {
            self.changed(id);
        }
        vec![Action::SelectionChanged, Action::RenderNeeded]
    }
}

// =============================================================================
// BROWSER WRAPPER
// =============================================================================

/// The full editor: `EngineCore` plus the canvas it draws into.
pub struct Engine {
    canvas: HtmlCanvasElement,
    textures: TextureCache,
    pub core: EngineCore,
}

impl Engine {
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, config: EditorConfig) -> Self {
        Self { canvas, textures: TextureCache::new(), core: EngineCore::with_config(config) }
    }

    /// Resize the backing store and record the viewport.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.canvas.set_width(device_px(width_css * dpr));
        self.canvas.set_height(device_px(height_css * dpr));
        self.core.set_viewport(width_css, height_css, dpr);
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn on_drop(&mut self, screen_pt: Point, payload: &DropPayload) -> Vec<Action> {
        self.core.on_drop(screen_pt, payload)
    }

    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        self.core.tick(now_ms)
    }

    /// Draw the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the 2D context is unavailable or a canvas call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        render::draw(&ctx, &self.core, &mut self.textures)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_px(v: f64) -> u32 {
    v.round().max(0.0) as u32
}
