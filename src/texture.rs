//! Texture mapping state and the rules that step it.
//!
//! Rects and triangles paint a texture brush transformed by scale, rotation
//! and pixel offset. Scale is bounded and kept to four decimals; rotation and
//! offset are free-form. Image decoding sits behind [`TextureLoader`] so the
//! engine never sees a decode failure: a bad path just leaves the handle empty.

#[cfg(test)]
#[path = "texture_test.rs"]
mod texture_test;

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::consts::{
    IMAGE_EXTENSIONS, JUMP_PAD_ROTATION_STEP_DEG, JUMP_PAD_ROTATION_STEP_FINE_DEG, MAX_TEXTURE_SCALE,
    MIN_TEXTURE_SCALE, ROTATION_SNAP_DEG, SCALE_STEP, SCALE_STEP_FINE,
};
use crate::geom::Point;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to decode texture {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// Decoded texture pixels. Cloning shares the buffer.
#[derive(Clone)]
pub struct TextureImage(Arc<RgbaImage>);

impl TextureImage {
    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self(Arc::new(pixels))
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }

    /// Whether both handles share one decoded buffer.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureImage({}x{})", self.width(), self.height())
    }
}

/// Scale/rotation/offset/path transform applied to a shape's texture brush.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureMapping {
    pub path: Option<String>,
    /// `None` until a path is set and decodes successfully.
    #[serde(skip)]
    pub image: Option<TextureImage>,
    pub scale: f64,
    pub rotation: f64,
    pub offset: Point,
}

impl Default for TextureMapping {
    fn default() -> Self {
        Self { path: None, image: None, scale: 1.0, rotation: 0.0, offset: Point::default() }
    }
}

impl TextureMapping {
    /// Point at a new image, resetting scale, rotation and offset.
    pub fn reset_to(&mut self, path: String, image: Option<TextureImage>) {
        self.path = Some(path);
        self.image = image;
        self.scale = 1.0;
        self.rotation = 0.0;
        self.offset = Point::default();
    }
}

// =============================================================================
// STEPPING RULES
// =============================================================================

/// Round to four decimal places.
#[must_use]
pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Clamp into the allowed scale range and round to four decimals.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    round4(scale.clamp(MIN_TEXTURE_SCALE, MAX_TEXTURE_SCALE))
}

/// Multiplicative scale step for `notches` wheel notches.
///
/// Each notch adds 10% of the current scale (1% with `fine`).
#[must_use]
pub fn step_scale(current: f64, notches: f64, fine: bool) -> f64 {
    let step = if fine { SCALE_STEP_FINE } else { SCALE_STEP };
    clamp_scale(current + current * step * notches)
}

/// Texture rotation after a drag, snapped to 15° unless `fine`.
#[must_use]
pub fn snap_rotation(deg: f64, fine: bool) -> f64 {
    if fine {
        deg
    } else {
        (deg / ROTATION_SNAP_DEG).round() * ROTATION_SNAP_DEG
    }
}

/// Bring a jump-pad rotation into (-360, 360].
#[must_use]
pub fn normalize_rotation(deg: f64) -> f64 {
    if deg > 360.0 || deg <= -360.0 {
        let r = (deg + 360.0).rem_euclid(720.0) - 360.0;
        if r <= -360.0 { r + 720.0 } else { r }
    } else {
        deg
    }
}

/// Jump-pad rotation after `notches` wheel notches: 5° per notch, 1° with `fine`.
#[must_use]
pub fn step_jump_pad_rotation(current: f64, notches: f64, fine: bool) -> f64 {
    let step = if fine { JUMP_PAD_ROTATION_STEP_FINE_DEG } else { JUMP_PAD_ROTATION_STEP_DEG };
    normalize_rotation(current + notches * step)
}

// =============================================================================
// PATHS
// =============================================================================

/// Resolve a texture reference against the map definition file.
///
/// Absolute references pass through unchanged; relative ones are joined to
/// the map file's directory and normalized. Empty references resolve to `None`.
#[must_use]
pub fn resolve_texture_path(texture: &str, map_file: &Path) -> Option<PathBuf> {
    if texture.is_empty() {
        return None;
    }
    let tex = Path::new(texture);
    if tex.is_absolute() {
        return Some(tex.to_path_buf());
    }
    let base = map_file.parent().unwrap_or_else(|| Path::new(""));
    Some(normalize_lexically(&base.join(tex)))
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Whether `path` names a file with an accepted image extension.
#[must_use]
pub fn is_image_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|ok| ext.eq_ignore_ascii_case(ok)))
}

// =============================================================================
// LOADING
// =============================================================================

/// Decodes texture files into images.
pub trait TextureLoader {
    /// # Errors
    ///
    /// Returns `Missing` if there is no file at `path`, `Decode` if it isn't a readable image.
    fn load(&self, path: &Path) -> Result<TextureImage, TextureError>;
}

/// Loads textures from the local filesystem with the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsTextureLoader;

impl TextureLoader for FsTextureLoader {
    fn load(&self, path: &Path) -> Result<TextureImage, TextureError> {
        if !path.is_file() {
            return Err(TextureError::Missing(path.to_path_buf()));
        }
        let decoded = image::open(path)
            .map_err(|e| TextureError::Decode { path: path.to_path_buf(), message: e.to_string() })?;
        Ok(TextureImage::new(decoded.to_rgba8()))
    }
}

/// Load a texture, logging and swallowing failures.
pub fn load_or_none(loader: &dyn TextureLoader, path: &str) -> Option<TextureImage> {
    match loader.load(Path::new(path)) {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::warn!(error = %e, "texture load failed; falling back to flat fill");
            None
        }
    }
}
