//! Editor configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{DEFAULT_GRID_SIZE, EDGE_MARGIN, MIN_CANVAS_HEIGHT, MIN_CANVAS_WIDTH, OVERLAY_MS, POINT_RADIUS};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: cannot parse '{value}'")]
    Parse { var: &'static str, value: String },
    #[error("{var}: '{value}' must be positive")]
    OutOfRange { var: &'static str, value: String },
}

/// Every tunable the engine reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// Snapping grid pitch; also the minimum rect side.
    pub grid_size: f64,
    /// Resize hot-area width inside each rect edge.
    pub edge_margin: f64,
    /// Manhattan grab radius around triangle vertices.
    pub point_radius: f64,
    /// Lifetime of the timed texture overlays.
    pub overlay_ms: f64,
    pub min_canvas_width: f64,
    pub min_canvas_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            edge_margin: EDGE_MARGIN,
            point_radius: POINT_RADIUS,
            overlay_ms: OVERLAY_MS,
            min_canvas_width: MIN_CANVAS_WIDTH,
            min_canvas_height: MIN_CANVAS_HEIGHT,
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `MAPCANVAS_GRID_SIZE`: default 16
    /// - `MAPCANVAS_EDGE_MARGIN`: default 8
    /// - `MAPCANVAS_POINT_RADIUS`: default 8
    /// - `MAPCANVAS_OVERLAY_MS`: default 1000
    /// - `MAPCANVAS_MIN_CANVAS`: `WxH`, default `1024x768`
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but unparsable or not positive.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(raw)) => Some(raw.to_string_lossy().into_owned()),
        })
    }

    /// Same as [`EditorConfig::from_env`] with an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparsable or not positive.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let (min_canvas_width, min_canvas_height) = match lookup("MAPCANVAS_MIN_CANVAS") {
            Some(raw) => parse_size("MAPCANVAS_MIN_CANVAS", &raw)?,
            None => (defaults.min_canvas_width, defaults.min_canvas_height),
        };

        Ok(Self {
            grid_size: positive(&lookup, "MAPCANVAS_GRID_SIZE", defaults.grid_size)?,
            edge_margin: positive(&lookup, "MAPCANVAS_EDGE_MARGIN", defaults.edge_margin)?,
            point_radius: positive(&lookup, "MAPCANVAS_POINT_RADIUS", defaults.point_radius)?,
            overlay_ms: positive(&lookup, "MAPCANVAS_OVERLAY_MS", defaults.overlay_ms)?,
            min_canvas_width,
            min_canvas_height,
        })
    }
}

fn positive(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: f64) -> Result<f64, ConfigError> {
    match lookup(var) {
        Some(raw) => parse_positive(var, &raw),
        None => Ok(default),
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw.trim().parse().map_err(|_| ConfigError::Parse { var, value: raw.to_string() })?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::OutOfRange { var, value: raw.to_string() });
    }
    Ok(value)
}

fn parse_size(var: &'static str, raw: &str) -> Result<(f64, f64), ConfigError> {
    let Some((w, h)) = raw.trim().split_once(['x', 'X']) else {
        return Err(ConfigError::Parse { var, value: raw.to_string() });
    };
    Ok((parse_positive(var, w)?, parse_positive(var, h)?))
}
