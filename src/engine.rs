//! Scene engine: floors, walls, shapes and the meshes built from them.
//!
//! The engine is the single owner of mutable scene state. Wall edits rebuild
//! the floor's meshes before they are published, so queries never see a
//! half-built mesh. Queries take the viewer, floor and camera explicitly
//! through [`ViewContext`] instead of reading ambient state.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::collision::calculate_delta;
use crate::config::Config;
use crate::geom::{Point, Vector};
use crate::lighting::{LitRegion, light_region, token_halo};
use crate::mesh::{Bounds, MeshError, Purpose, Wall};
use crate::registry::{FloorId, MeshRegistry};
use crate::shape::{Shape, ShapeId, ShapeStore, Viewer};
use crate::units::Camera;
use crate::visibility::compute_visibility;

/// Error returned by fallible [`Engine`] operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown floor {0}")]
    UnknownFloor(FloorId),
    #[error("unknown shape {0}")]
    UnknownShape(ShapeId),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error("invalid scene: {0}")]
    Scene(#[from] serde_json::Error),
}

/// A floor: its extent and the walls drawn on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    /// Extent of the floor; a square of the configured extent when absent.
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub walls: Vec<Wall>,
}

/// Serialized scene: configuration, floors and shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub floors: Vec<Floor>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl Scene {
    /// Parse a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Scene`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Who is looking, at what, and through which camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewContext {
    pub floor: FloorId,
    pub viewer: Viewer,
    #[serde(default)]
    pub camera: Camera,
    /// Screen size used to cull lights; `None` disables culling.
    #[serde(default)]
    pub viewport: Option<(f64, f64)>,
    /// Everything outside lit regions is fogged, so the viewer's own tokens
    /// get a halo.
    #[serde(default)]
    pub full_fow: bool,
    /// Tokens the viewer is currently playing.
    #[serde(default)]
    pub active_tokens: Vec<ShapeId>,
}

/// Scene state and the queries run against it.
#[derive(Debug, Default)]
pub struct Engine {
    registry: MeshRegistry,
    floors: HashMap<FloorId, Floor>,
    shapes: ShapeStore,
    config: Config,
}

impl Engine {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, ..Self::default() }
    }

    /// Load every floor and shape of `scene`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Mesh`] if a floor's walls fail to triangulate
    /// and [`EngineError::UnknownFloor`] for a shape on a missing floor.
    pub fn from_scene(scene: Scene) -> Result<Self, EngineError> {
        let mut engine = Self::new(scene.config);
        for floor in scene.floors {
            engine.add_floor(floor)?;
        }
        for shape in scene.shapes {
            engine.insert_shape(shape)?;
        }
        info!(floors = engine.floors.len(), shapes = engine.shapes.len(), "engine: scene loaded");
        Ok(engine)
    }

    // --- Floors and walls ---

    /// Add or replace a floor and build its meshes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Mesh`] if the meshes fail to build; the
    /// previous floor, if any, stays in place.
    pub fn add_floor(&mut self, floor: Floor) -> Result<(), EngineError> {
        let bounds = self.bounds_of(&floor);
        self.registry.rebuild_floor(floor.id, &bounds, &floor.walls)?;
        info!(floor = floor.id, walls = floor.walls.len(), "engine: floor added");
        self.floors.insert(floor.id, floor);
        Ok(())
    }

    /// Replace the walls of `floor` and rebuild both of its meshes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownFloor`] for a missing floor and
    /// [`EngineError::Mesh`] if the meshes fail to build, in which case the
    /// old walls and meshes stay in place.
    pub fn set_walls(&mut self, floor: FloorId, walls: Vec<Wall>) -> Result<(), EngineError> {
        let bounds = match self.floors.get(&floor) {
            Some(f) => self.bounds_of(f),
            None => return Err(EngineError::UnknownFloor(floor)),
        };
        self.registry.rebuild_floor(floor, &bounds, &walls)?;
        info!(floor, walls = walls.len(), "engine: walls replaced");
        if let Some(f) = self.floors.get_mut(&floor) {
            f.walls = walls;
        }
        Ok(())
    }

    /// Add one wall to `floor` and rebuild its meshes.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::set_walls`].
    pub fn add_wall(&mut self, floor: FloorId, wall: Wall) -> Result<(), EngineError> {
        let mut walls = self.floors.get(&floor).ok_or(EngineError::UnknownFloor(floor))?.walls.clone();
        walls.push(wall);
        self.set_walls(floor, walls)
    }

    /// Drop a floor with its meshes and shapes.
    pub fn remove_floor(&mut self, floor: FloorId) -> Option<Floor> {
        let removed = self.floors.remove(&floor)?;
        self.registry.remove_floor(floor);
        let shapes = self.shapes.remove_floor(floor);
        info!(floor, shapes, "engine: floor removed");
        Some(removed)
    }

    #[must_use]
    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.floors.get(&id)
    }

    fn bounds_of(&self, floor: &Floor) -> Bounds {
        floor.bounds.unwrap_or_else(|| Bounds::square(self.config.floor_extent))
    }

    // --- Shapes ---

    /// Add or replace a shape.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownFloor`] if the shape's floor is missing.
    pub fn insert_shape(&mut self, shape: Shape) -> Result<(), EngineError> {
        if !self.floors.contains_key(&shape.floor) {
            return Err(EngineError::UnknownFloor(shape.floor));
        }
        self.shapes.insert(shape);
        Ok(())
    }

    pub fn remove_shape(&mut self, id: &ShapeId) -> Option<Shape> {
        self.shapes.remove(id)
    }

    #[must_use]
    pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    // --- Queries ---

    #[must_use]
    pub fn registry(&self) -> &MeshRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Visibility polygon of `observer` on `floor`.
    #[must_use]
    pub fn visibility(&self, floor: FloorId, observer: Point) -> Vec<Point> {
        compute_visibility(&self.registry, observer, Purpose::Vision, floor)
    }

    /// The part of `delta` shape `id` can move without crossing a wall.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShape`] for a missing shape.
    pub fn resolve_drag(&self, id: &ShapeId, delta: Vector, shrink: bool) -> Result<Vector, EngineError> {
        let shape = self.shapes.get(id).ok_or(EngineError::UnknownShape(*id))?;
        Ok(calculate_delta(&self.registry, &self.config.collision, delta, shape, shrink))
    }

    /// Move shape `id` by as much of `delta` as the walls allow and return
    /// the applied translation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShape`] for a missing shape.
    pub fn drag(&mut self, id: &ShapeId, delta: Vector, shrink: bool) -> Result<Vector, EngineError> {
        self.drag_selection(std::slice::from_ref(id), delta, shrink)
    }

    /// Move every shape in `ids` by one shared translation, restricted by
    /// each of them in turn.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShape`] for the first missing shape;
    /// nothing moves in that case.
    pub fn drag_selection(&mut self, ids: &[ShapeId], delta: Vector, shrink: bool) -> Result<Vector, EngineError> {
        let mut resolved = delta;
        for id in ids {
            resolved = self.resolve_drag(id, resolved, shrink)?;
        }
        for id in ids {
            if let Some(shape) = self.shapes.get_mut(id) {
                shape.translate(resolved);
            }
        }
        debug!(shapes = ids.len(), dx = resolved.x, dy = resolved.y, "engine: selection dragged");
        Ok(resolved)
    }

    /// Halos around the viewer's active tokens on the viewed floor. Empty
    /// unless full fog is on.
    #[must_use]
    pub fn token_halos(&self, view: &ViewContext) -> Vec<LitRegion> {
        if !view.full_fow {
            return Vec::new();
        }
        view.active_tokens
            .iter()
            .filter_map(|id| self.shapes.get(id))
            .filter(|s| !s.skip_draw && s.floor == view.floor)
            .filter_map(|s| token_halo(s, &self.config.lighting))
            .collect()
    }

    /// Every region lit for `view`: token halos first, then each vision
    /// source on the floor that passes gating and camera culling.
    #[must_use]
    pub fn lit_regions(&self, view: &ViewContext) -> Vec<LitRegion> {
        let mut regions = self.token_halos(view);
        for source in self.shapes.vision_sources(view.floor) {
            let Some(shape) = self.shapes.get(&source.shape) else {
                continue;
            };
            let Some(aura) = shape.aura(&source.aura) else {
                continue;
            };
            if let Some((width, height)) = view.viewport {
                let reach = self.config.units.unit_distance(aura.light_radius() + aura.dim_radius());
                if !view.camera.circle_visible(shape.center(), reach, width, height) {
                    trace!(shape = %shape.id, aura = %aura.uuid, "engine: light outside viewport");
                    continue;
                }
            }
            if let Some(region) = light_region(
                &self.registry,
                shape,
                aura,
                &view.viewer,
                &self.config.units,
                &self.config.lighting,
            ) {
                regions.push(region);
            }
        }
        regions
    }
}
