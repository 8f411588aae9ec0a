//! Entity model: the placeable map objects and their kind-specific data.
//!
//! Every entity carries a local geometry (a rect or a three-point polygon), a
//! scene position that translates local space into the scene, a z value, and a
//! closed set of kind-specific attributes in [`EntityData`]. Feature checks are
//! pattern matches over that enum.
//!
//! Positions never change without passing through
//! [`Entity::intercept_position`], which keeps the visible top-left (or the
//! raw position, for polygons) on the grid.

#[cfg(test)]
#[path = "entity_test.rs"]
mod entity_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::{self, Point, Rect};
use crate::snap::{snap, snap_point};
use crate::texture::TextureMapping;

/// Unique identifier for an entity.
pub type EntityId = Uuid;

/// Kind tag, derived from [`EntityData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Rect,
    Triangle,
    JumpPad,
    Spawn,
    StartLine,
    Portal,
    Item,
}

impl EntityKind {
    /// Lowercase name used in logs and layer listings.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Triangle => "triangle",
            Self::JumpPad => "jump_pad",
            Self::Spawn => "spawn",
            Self::StartLine => "start_line",
            Self::Portal => "portal",
            Self::Item => "item",
        }
    }
}

/// Gameplay classification of a rect or triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceType {
    Static,
    Wall,
    Deco,
    Death,
    Ramp,
}

/// Weapon granted by a pickup item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponType {
    #[default]
    Plasma,
    Rocket,
}

/// Which end of a portal pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalRole {
    #[default]
    Entry,
    Exit,
}

/// Local geometry of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Rect(Rect),
    /// Vertex order is identity: vertex drags address points by index.
    Triangle { points: [Point; 3] },
}

/// Surface and texture state shared by rects and triangles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeData {
    pub surface: SurfaceType,
    #[serde(default)]
    pub texture: TextureMapping,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpPadData {
    pub velocity: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalData {
    pub role: PortalRole,
    pub portal_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    pub weapon: WeaponType,
    pub ammo: u32,
    pub stay: bool,
}

/// Kind-specific attributes. Each variant has a fixed field set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityData {
    Rect(ShapeData),
    Triangle(ShapeData),
    JumpPad(JumpPadData),
    Spawn,
    StartLine,
    Portal(PortalData),
    Item(ItemData),
}

/// A placeable map object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Translation from local space to scene space.
    pub pos: Point,
    pub geometry: Geometry,
    /// Shape rotation in degrees around the local center. Only jump pads change it.
    #[serde(default)]
    pub rotation: f64,
    /// Stacking order; lower values are drawn beneath higher values.
    #[serde(default)]
    pub z: i64,
    pub data: EntityData,
    #[serde(skip)]
    pub selected: bool,
    /// Transient duplicate-drag preview, not yet committed content.
    #[serde(skip)]
    pub ghost: bool,
    #[serde(skip, default = "full_opacity")]
    pub opacity: f64,
}

fn full_opacity() -> f64 {
    1.0
}

impl Entity {
    fn with(pos: Point, geometry: Geometry, data: EntityData) -> Self {
        Self {
            id: Uuid::new_v4(),
            pos,
            geometry,
            rotation: 0.0,
            z: 0,
            data,
            selected: false,
            ghost: false,
            opacity: 1.0,
        }
    }

    /// A `static` rectangle with the given local rect.
    #[must_use]
    pub fn rect(pos: Point, local: Rect) -> Self {
        Self::with(
            pos,
            Geometry::Rect(local),
            EntityData::Rect(ShapeData { surface: SurfaceType::Static, texture: TextureMapping::default() }),
        )
    }

    /// A `ramp` triangle with the given vertices (local space).
    #[must_use]
    pub fn triangle(pos: Point, points: [Point; 3]) -> Self {
        Self::with(
            pos,
            Geometry::Triangle { points },
            EntityData::Triangle(ShapeData { surface: SurfaceType::Ramp, texture: TextureMapping::default() }),
        )
    }

    /// Right triangle with the right angle at the bottom-right corner.
    #[must_use]
    pub fn right_triangle(pos: Point, size: f64) -> Self {
        Self::triangle(pos, [Point::new(size, size), Point::new(0.0, size), Point::new(size, 0.0)])
    }

    #[must_use]
    pub fn jump_pad(pos: Point, velocity: Point, rotation: f64) -> Self {
        let mut e = Self::with(pos, Geometry::Rect(Rect::new(0.0, 0.0, 96.0, 32.0)), EntityData::JumpPad(JumpPadData {
            velocity,
        }));
        e.rotation = rotation;
        e
    }

    #[must_use]
    pub fn spawn(pos: Point) -> Self {
        Self::with(pos, Geometry::Rect(Rect::new(0.0, 0.0, 64.0, 96.0)), EntityData::Spawn)
    }

    #[must_use]
    pub fn start_line(pos: Point) -> Self {
        Self::with(pos, Geometry::Rect(Rect::new(0.0, 0.0, 64.0, 64.0)), EntityData::StartLine)
    }

    #[must_use]
    pub fn portal(pos: Point, role: PortalRole, portal_id: u32) -> Self {
        Self::with(pos, Geometry::Rect(Rect::new(0.0, 0.0, 32.0, 32.0)), EntityData::Portal(PortalData {
            role,
            portal_id,
        }))
    }

    #[must_use]
    pub fn item(pos: Point, weapon: WeaponType, ammo: u32, stay: bool) -> Self {
        Self::with(pos, Geometry::Rect(Rect::new(0.0, 0.0, 32.0, 32.0)), EntityData::Item(ItemData {
            weapon,
            ammo,
            stay,
        }))
    }

    // --- Kind queries ---

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self.data {
            EntityData::Rect(_) => EntityKind::Rect,
            EntityData::Triangle(_) => EntityKind::Triangle,
            EntityData::JumpPad(_) => EntityKind::JumpPad,
            EntityData::Spawn => EntityKind::Spawn,
            EntityData::StartLine => EntityKind::StartLine,
            EntityData::Portal(_) => EntityKind::Portal,
            EntityData::Item(_) => EntityKind::Item,
        }
    }

    /// Surface and texture state, for rects and triangles.
    #[must_use]
    pub fn shape(&self) -> Option<&ShapeData> {
        match &self.data {
            EntityData::Rect(s) | EntityData::Triangle(s) => Some(s),
            _ => None,
        }
    }

    pub fn shape_mut(&mut self) -> Option<&mut ShapeData> {
        match &mut self.data {
            EntityData::Rect(s) | EntityData::Triangle(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn texture(&self) -> Option<&TextureMapping> {
        self.shape().map(|s| &s.texture)
    }

    pub fn texture_mut(&mut self) -> Option<&mut TextureMapping> {
        self.shape_mut().map(|s| &mut s.texture)
    }

    #[must_use]
    pub fn is_texturable(&self) -> bool {
        self.shape().is_some()
    }

    #[must_use]
    pub fn local_rect(&self) -> Option<Rect> {
        match self.geometry {
            Geometry::Rect(r) => Some(r),
            Geometry::Triangle { .. } => None,
        }
    }

    #[must_use]
    pub fn triangle_points(&self) -> Option<[Point; 3]> {
        match self.geometry {
            Geometry::Triangle { points } => Some(points),
            Geometry::Rect(_) => None,
        }
    }

    // --- Coordinates ---

    /// Local center: rect center, or the centroid for triangles.
    #[must_use]
    pub fn local_center(&self) -> Point {
        match &self.geometry {
            Geometry::Rect(r) => r.center(),
            Geometry::Triangle { points } => geom::centroid(points),
        }
    }

    /// Map a local point into the scene, applying shape rotation around the local center.
    #[must_use]
    pub fn to_scene(&self, local: Point) -> Point {
        let rotated = if self.rotation == 0.0 {
            local
        } else {
            geom::rotate_about(local, self.local_center(), self.rotation)
        };
        rotated + self.pos
    }

    /// Inverse of [`Entity::to_scene`].
    #[must_use]
    pub fn to_local(&self, scene: Point) -> Point {
        let local = scene - self.pos;
        if self.rotation == 0.0 {
            local
        } else {
            geom::rotate_about(local, self.local_center(), -self.rotation)
        }
    }

    /// Scene position of the geometric top-left (rect origin, or `pos` for polygons).
    #[must_use]
    pub fn scene_top_left(&self) -> Point {
        match self.geometry {
            Geometry::Rect(r) => self.pos + r.top_left(),
            Geometry::Triangle { .. } => self.pos,
        }
    }

    /// Outline in scene space, in drawing order.
    #[must_use]
    pub fn scene_outline(&self) -> Vec<Point> {
        match &self.geometry {
            Geometry::Rect(r) => r.corners().iter().map(|c| self.to_scene(*c)).collect(),
            Geometry::Triangle { points } => points.iter().map(|p| self.to_scene(*p)).collect(),
        }
    }

    /// Axis-aligned scene bounding box.
    #[must_use]
    pub fn scene_bounds(&self) -> Rect {
        Rect::bounding(&self.scene_outline())
    }

    /// Whether the scene point lies on the entity's shape.
    #[must_use]
    pub fn contains(&self, scene: Point) -> bool {
        let local = self.to_local(scene);
        match &self.geometry {
            Geometry::Rect(r) => r.contains(local),
            Geometry::Triangle { points } => geom::triangle_contains(points, local),
        }
    }

    // --- Position interception ---

    /// Grid-aligned position for a requested `target` position.
    ///
    /// Rect geometries snap the resulting scene top-left (`target + origin`),
    /// so a non-zero local origin still lands on the grid. Polygons snap the raw
    /// position.
    #[must_use]
    pub fn intercept_position(&self, target: Point, pitch: f64) -> Point {
        match self.geometry {
            Geometry::Rect(r) => {
                let origin = r.top_left();
                snap_point(target + origin, pitch) - origin
            }
            Geometry::Triangle { .. } => snap_point(target, pitch),
        }
    }

    /// Move to `target` through interception. Returns whether the position changed.
    pub fn move_to(&mut self, target: Point, pitch: f64) -> bool {
        let snapped = self.intercept_position(target, pitch);
        if snapped == self.pos {
            return false;
        }
        self.pos = snapped;
        true
    }

    /// Snap every triangle vertex in local space. No-op for rects.
    pub fn snap_vertices(&mut self, pitch: f64) {
        if let Geometry::Triangle { points } = &mut self.geometry {
            for p in points.iter_mut() {
                *p = snap_point(*p, pitch);
            }
        }
    }

    /// Structural copy with a fresh id, unselected.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self { id: Uuid::new_v4(), selected: false, ghost: false, opacity: 1.0, ..self.clone() }
    }
}

/// Clamp a rect so both sides are at least `min` long, growing right and down.
#[must_use]
pub fn enforce_min_size(r: Rect, min: f64) -> Rect {
    let r = r.normalized();
    Rect::new(r.x, r.y, r.width.max(min), r.height.max(min))
}

/// Snap every edge of `r` to the grid independently.
#[must_use]
pub fn snap_edges(r: Rect, pitch: f64) -> Rect {
    Rect::from_edges(snap(r.left(), pitch), snap(r.top(), pitch), snap(r.right(), pitch), snap(r.bottom(), pitch))
}
