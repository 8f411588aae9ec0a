//! Grid snapping.
//!
//! Every coordinate the editor commits passes through [`snap`]. The same
//! function is used for absolute positions and for drag deltas.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use crate::geom::Point;

/// Round `value` to the nearest multiple of `pitch`.
///
/// Ties round half away from zero. A non-positive `pitch` leaves the value untouched.
#[must_use]
pub fn snap(value: f64, pitch: f64) -> f64 {
    if pitch <= 0.0 {
        return value;
    }
    let snapped = (value / pitch).round() * pitch;
    // Avoid handing out -0.0.
    if snapped == 0.0 { 0.0 } else { snapped }
}

/// Snap both coordinates of a point.
#[must_use]
pub fn snap_point(p: Point, pitch: f64) -> Point {
    Point::new(snap(p.x, pitch), snap(p.y, pitch))
}
