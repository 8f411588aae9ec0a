//! Shared numeric constants for the map canvas.

// ── Grid ────────────────────────────────────────────────────────

/// Default spacing of the snapping grid, in scene units.
pub const DEFAULT_GRID_SIZE: f64 = 16.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Width of the resize "hot area" inside each rect edge, in local units.
pub const EDGE_MARGIN: f64 = 8.0;

/// Manhattan radius around a triangle vertex that grabs the vertex.
pub const POINT_RADIUS: f64 = 8.0;

// ── Texture mapping ─────────────────────────────────────────────

/// Lower bound for texture scale.
pub const MIN_TEXTURE_SCALE: f64 = 0.01;

/// Upper bound for texture scale.
pub const MAX_TEXTURE_SCALE: f64 = 10.0;

/// Fraction of the current scale applied per wheel notch.
pub const SCALE_STEP: f64 = 0.1;

/// Fraction of the current scale applied per wheel notch with the precision modifier.
pub const SCALE_STEP_FINE: f64 = 0.01;

/// Texture rotation snaps to multiples of this angle unless the precision modifier is held.
pub const ROTATION_SNAP_DEG: f64 = 15.0;

// ── Jump pads ───────────────────────────────────────────────────

/// Jump-pad rotation per wheel notch, in degrees.
pub const JUMP_PAD_ROTATION_STEP_DEG: f64 = 5.0;

/// Jump-pad rotation per wheel notch with the precision modifier.
pub const JUMP_PAD_ROTATION_STEP_FINE_DEG: f64 = 1.0;

// ── View ────────────────────────────────────────────────────────

/// Wheel delta (pixels) that counts as one notch.
pub const WHEEL_NOTCH_PX: f64 = 100.0;

/// Zoom factor per alt+wheel notch.
pub const ZOOM_FACTOR: f64 = 1.15;

/// Scene bounds keep this fraction of the viewport as margin.
pub const VIEWPORT_MARGIN_RATIO: f64 = 0.1;

/// Smallest logical canvas width, in scene units.
pub const MIN_CANVAS_WIDTH: f64 = 1024.0;

/// Smallest logical canvas height, in scene units.
pub const MIN_CANVAS_HEIGHT: f64 = 768.0;

// ── Overlays and ghosts ─────────────────────────────────────────

/// How long transient overlays stay visible after the last change.
pub const OVERLAY_MS: f64 = 1000.0;

/// Opacity of a ghost copy while a duplicate-drag is in progress.
pub const GHOST_OPACITY: f64 = 0.5;

/// Image extensions accepted by texture drops.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];
