//! Input model: modifier keys, mouse buttons, drop payloads, and the gesture state machine.
//!
//! `InputState` is the single active gesture between pointer-down and
//! pointer-up. Each variant carries what it needs to compute the next
//! mutation from the press-time snapshot, and to restore that snapshot if
//! the gesture is aborted.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::duplicate::Duplication;
use crate::entity::EntityId;
use crate::geom::{Point, Rect};
use crate::hit::ResizeZone;
use crate::texture::is_image_path;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held. Doubles as the precision modifier.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl, or Command on macOS hosts.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }

    /// Disables grid snapping and selects the fine wheel step.
    #[must_use]
    pub fn precision(self) -> bool {
        self.shift
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`, `"a"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Data carried by a drag-and-drop onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPayload {
    /// A URL list; only the first entry is used.
    Urls(Vec<String>),
    /// Plain text holding a path.
    Text(String),
}

impl DropPayload {
    /// Local filesystem path named by the payload.
    #[must_use]
    pub fn path(&self) -> Option<String> {
        let raw = match self {
            Self::Urls(urls) => urls.first()?.trim(),
            Self::Text(text) => text.trim(),
        };
        let path = raw.strip_prefix("file://").unwrap_or(raw);
        (!path.is_empty()).then(|| path.to_string())
    }

    /// Whether the payload names an image file the canvas will take.
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        self.path().is_some_and(|p| is_image_path(&p))
    }
}

/// Active gesture.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Middle-button drag panning the view.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Native move of the pressed entity and the rest of the selection.
    DefaultMove {
        id: EntityId,
        start_scene: Point,
        /// Press-time position of every entity being moved.
        origins: Vec<(EntityId, Point)>,
        /// Whether any entity position changed.
        moved: bool,
        /// Whether the pointer left the press point. A release without it is a click.
        dragged: bool,
        /// Whether `id` was already selected before the press.
        was_selected: bool,
    },
    /// Dragging one edge or corner of a rect.
    Resizing { id: EntityId, zone: ResizeZone, start_local: Point, orig_rect: Rect },
    /// Dragging one triangle vertex.
    MovingVertex { id: EntityId, index: usize, orig: [Point; 3] },
    /// Ctrl-drag moving the texture offset.
    DraggingTexture { id: EntityId, start_scene: Point, orig_offset: Point },
    /// Shift-drag producing ghost copies.
    Duplicating(Duplication),
    /// Alt-drag rotating the texture about the shape center.
    Rotating { id: EntityId, center: Point, start_scene: Point, orig_rotation: f64 },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Short gesture name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Panning { .. } => "panning",
            Self::DefaultMove { .. } => "move",
            Self::Resizing { .. } => "resize",
            Self::MovingVertex { .. } => "vertex",
            Self::DraggingTexture { .. } => "texture_drag",
            Self::Duplicating(_) => "duplicate",
            Self::Rotating { .. } => "texture_rotate",
        }
    }

    /// Entity the gesture operates on, if any.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match self {
            Self::Idle | Self::Panning { .. } => None,
            Self::DefaultMove { id, .. }
            | Self::Resizing { id, .. }
            | Self::MovingVertex { id, .. }
            | Self::DraggingTexture { id, .. }
            | Self::Rotating { id, .. } => Some(*id),
            Self::Duplicating(dup) => Some(dup.pressed()),
        }
    }
}
