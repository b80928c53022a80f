//! Shape model: tokens and other floor objects, and the in-memory store.
//!
//! A [`Shape`] is what the collision resolver moves and what auras hang off.
//! Its outline is a list of world points; the center is the middle of the
//! outline's bounding box. Ownership decides whether a viewer sees through a
//! shape's vision sources.
//!
//! The [`ShapeStore`] owns every live shape, keyed by id. Floors never own
//! shapes directly; the engine asks the store which shapes sit on a floor.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aura::{Aura, AuraId};
use crate::geom::{Point, Vector};
use crate::registry::FloorId;

/// Unique identifier for a shape.
pub type ShapeId = Uuid;

/// The user looking at the board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub name: String,
    /// Game masters own everything.
    #[serde(default)]
    pub is_dm: bool,
}

impl Viewer {
    #[must_use]
    pub fn player(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_dm: false }
    }

    #[must_use]
    pub fn dm(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_dm: true }
    }
}

/// Per-user ownership of a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeOwner {
    pub user: String,
    /// Whether this owner sees through the shape's vision sources.
    #[serde(default = "default_true")]
    pub vision_access: bool,
}

fn default_true() -> bool {
    true
}

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }
}

/// A shape placed on a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Unique identifier for this shape.
    pub id: ShapeId,
    /// Floor the shape sits on.
    pub floor: FloorId,
    /// Outline points in world coordinates.
    pub points: Vec<Point>,
    /// Users owning this shape.
    #[serde(default)]
    pub owners: Vec<ShapeOwner>,
    /// Everyone gets vision access through this shape.
    #[serde(default)]
    pub default_vision_access: bool,
    /// Hidden shapes still collide but never get a token halo.
    #[serde(default)]
    pub skip_draw: bool,
    /// Light and vision sources attached to this shape.
    #[serde(default)]
    pub auras: Vec<Aura>,
}

impl Shape {
    /// New shape with no owners and no auras.
    #[must_use]
    pub fn new(floor: FloorId, points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            floor,
            points,
            owners: Vec::new(),
            default_vision_access: false,
            skip_draw: false,
            auras: Vec::new(),
        }
    }

    /// Axis-aligned rectangle outline with its top-left corner at `origin`.
    #[must_use]
    pub fn rect(floor: FloorId, origin: Point, width: f64, height: f64) -> Self {
        let Point { x, y } = origin;
        Self::new(
            floor,
            vec![
                origin,
                Point::new(x + width, y),
                Point::new(x + width, y + height),
                Point::new(x, y + height),
            ],
        )
    }

    /// Bounding box of the outline, `None` for a shape without points.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = *self.points.first()?;
        let mut bb = BoundingBox { min: first, max: first };
        for p in &self.points[1..] {
            bb.min.x = bb.min.x.min(p.x);
            bb.min.y = bb.min.y.min(p.y);
            bb.max.x = bb.max.x.max(p.x);
            bb.max.y = bb.max.y.max(p.y);
        }
        Some(bb)
    }

    /// Center of the bounding box. A shape without points centers on the origin.
    #[must_use]
    pub fn center(&self) -> Point {
        self.bounding_box().map_or(Point::new(0.0, 0.0), |bb| bb.center())
    }

    /// Width of the bounding box.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.bounding_box().map_or(0.0, |bb| bb.width())
    }

    /// Move every outline point by `delta`.
    pub fn translate(&mut self, delta: Vector) {
        for p in &mut self.points {
            *p = *p + delta;
        }
    }

    /// Whether `viewer` owns this shape. With `vision_access` the ownership
    /// must also grant vision.
    #[must_use]
    pub fn owned_by(&self, viewer: &Viewer, vision_access: bool) -> bool {
        if viewer.is_dm {
            return true;
        }
        if vision_access && self.default_vision_access {
            return true;
        }
        self.owners
            .iter()
            .any(|o| o.user == viewer.name && (!vision_access || o.vision_access))
    }

    /// Attached aura by id.
    #[must_use]
    pub fn aura(&self, id: &AuraId) -> Option<&Aura> {
        self.auras.iter().find(|a| a.uuid == *id)
    }
}

/// Reference to one vision-source aura on one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisionSource {
    pub shape: ShapeId,
    pub aura: AuraId,
}

/// In-memory store of shapes.
#[derive(Debug, Default)]
pub struct ShapeStore {
    shapes: HashMap<ShapeId, Shape>,
}

impl ShapeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a shape. If a shape with the same `id` already
    /// exists it is overwritten.
    pub fn insert(&mut self, shape: Shape) {
        self.shapes.insert(shape.id, shape);
    }

    /// Remove a shape by id, returning it if it was present.
    pub fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        self.shapes.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn get_mut(&mut self, id: &ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id)
    }

    /// Shapes on `floor`, sorted by id for a stable order.
    #[must_use]
    pub fn on_floor(&self, floor: FloorId) -> Vec<&Shape> {
        let mut shapes: Vec<&Shape> = self.shapes.values().filter(|s| s.floor == floor).collect();
        shapes.sort_by_key(|s| s.id);
        shapes
    }

    /// Active vision-source auras of every shape on `floor`.
    #[must_use]
    pub fn vision_sources(&self, floor: FloorId) -> Vec<VisionSource> {
        self.on_floor(floor)
            .into_iter()
            .flat_map(|s| {
                s.auras
                    .iter()
                    .filter(|a| a.active && a.vision_source)
                    .map(|a| VisionSource { shape: s.id, aura: a.uuid })
            })
            .collect()
    }

    /// Remove every shape on `floor`, returning how many were dropped.
    pub fn remove_floor(&mut self, floor: FloorId) -> usize {
        let before = self.shapes.len();
        self.shapes.retain(|_, s| s.floor != floor);
        before - self.shapes.len()
    }

    /// Number of shapes currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if the store contains no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
