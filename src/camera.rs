#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::geom::{Point, Rect};

/// View state for pan/zoom over the scene.
///
/// `pan_x` / `pan_y` are in CSS pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point (CSS pixels) to scene coordinates.
    #[must_use]
    pub fn screen_to_scene(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a scene-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn scene_to_screen(&self, scene: Point) -> Point {
        Point {
            x: scene.x * self.zoom + self.pan_x,
            y: scene.y * self.zoom + self.pan_y,
        }
    }

    /// The scene-space rect covered by a viewport of the given CSS size.
    #[must_use]
    pub fn visible_rect(&self, viewport_w: f64, viewport_h: f64) -> Rect {
        let tl = self.screen_to_scene(Point::new(0.0, 0.0));
        let br = self.screen_to_scene(Point::new(viewport_w, viewport_h));
        Rect::from_edges(tl.x, tl.y, br.x, br.y)
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply zoom by `factor`, keeping the scene point under `anchor` fixed on screen.
    pub fn zoom_about(&mut self, anchor: Point, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        let scene = self.screen_to_scene(anchor);
        self.zoom *= factor;
        self.pan_x = anchor.x - scene.x * self.zoom;
        self.pan_y = anchor.y - scene.y * self.zoom;
    }
}

/// Screen rect for a viewport-fixed backdrop: scaled to the viewport width,
/// centered vertically when shorter than the viewport, else pinned to the top.
#[must_use]
pub fn fit_width(image_w: f64, image_h: f64, viewport_w: f64, viewport_h: f64) -> Rect {
    if image_w <= 0.0 {
        return Rect::new(0.0, 0.0, viewport_w, 0.0);
    }
    let height = image_h * viewport_w / image_w;
    let y = if height < viewport_h { (viewport_h - height) / 2.0 } else { 0.0 };
    Rect::new(0.0, y, viewport_w, height)
}
