//! Hit-testing: which part of an entity lies under a point.
//!
//! Rects expose eight resize zones along their inner border; triangles expose
//! their three vertices. Everything else only has a body.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::entity::{Entity, EntityId, EntityKind, Geometry, enforce_min_size, snap_edges};
use crate::geom::{Point, Rect};

/// Which part of an entity was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeZone(ResizeZone),
    /// Triangle vertex by index.
    Vertex(usize),
}

/// Edge or corner of a rect that a resize drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeZone {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeZone {
    /// CSS cursor name shown while hovering or dragging this zone.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Top | Self::Bottom => "ns-resize",
            Self::Left | Self::Right => "ew-resize",
            Self::TopLeft | Self::BottomRight => "nwse-resize",
            Self::TopRight | Self::BottomLeft => "nesw-resize",
        }
    }

    fn moves_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    /// Resize `orig` by the pointer delta `diff`.
    ///
    /// Only the edges this zone owns move. All four edges are then snapped and
    /// both sides are held to at least one grid pitch.
    #[must_use]
    pub fn apply(self, orig: Rect, diff: Point, pitch: f64) -> Rect {
        let dl = if self.moves_left() { diff.x } else { 0.0 };
        let dr = if self.moves_right() { diff.x } else { 0.0 };
        let dt = if self.moves_top() { diff.y } else { 0.0 };
        let db = if self.moves_bottom() { diff.y } else { 0.0 };
        let adjusted = orig.adjusted(dl, dt, dr, db);
        enforce_min_size(snap_edges(adjusted, pitch), pitch)
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub entity_id: EntityId,
    pub part: HitPart,
}

/// Resize zone under the local point `p`, if it is within `margin` of an edge.
///
/// Corners win over edges. Distances are strict: a point exactly `margin`
/// inside an edge is body, not border.
#[must_use]
pub fn resize_zone(p: Point, rect: Rect, margin: f64) -> Option<ResizeZone> {
    let r = rect.normalized();
    if !r.contains(p) {
        return None;
    }
    let left = p.x - r.left() < margin;
    let right = r.right() - p.x < margin;
    let top = p.y - r.top() < margin;
    let bottom = r.bottom() - p.y < margin;

    match (top, bottom, left, right) {
        (true, _, true, _) => Some(ResizeZone::TopLeft),
        (true, _, _, true) => Some(ResizeZone::TopRight),
        (_, true, true, _) => Some(ResizeZone::BottomLeft),
        (_, true, _, true) => Some(ResizeZone::BottomRight),
        (_, _, true, _) => Some(ResizeZone::Left),
        (_, _, _, true) => Some(ResizeZone::Right),
        (true, _, _, _) => Some(ResizeZone::Top),
        (_, true, _, _) => Some(ResizeZone::Bottom),
        _ => None,
    }
}

/// Index of the first triangle vertex within manhattan `radius` of the local point `p`.
#[must_use]
pub fn vertex_at(p: Point, points: &[Point; 3], radius: f64) -> Option<usize> {
    points.iter().position(|v| (p - *v).manhattan_length() < radius)
}

/// Part of `entity` under the scene point, or `None` if the point misses it.
#[must_use]
pub fn hit_part(entity: &Entity, scene_pt: Point, margin: f64, radius: f64) -> Option<HitPart> {
    let local = entity.to_local(scene_pt);
    match &entity.geometry {
        Geometry::Triangle { points } => {
            if let Some(i) = vertex_at(local, points, radius) {
                return Some(HitPart::Vertex(i));
            }
            entity.contains(scene_pt).then_some(HitPart::Body)
        }
        Geometry::Rect(r) => {
            if !r.contains(local) {
                return None;
            }
            if entity.kind() == EntityKind::Rect {
                if let Some(zone) = resize_zone(local, *r, margin) {
                    return Some(HitPart::ResizeZone(zone));
                }
            }
            Some(HitPart::Body)
        }
    }
}
