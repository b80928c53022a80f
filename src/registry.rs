//! Registry of published meshes keyed by purpose and floor.
//!
//! Meshes are rebuilt off to the side and swapped in whole. Readers clone the
//! `Arc` they were handed and keep querying that snapshot even if a newer mesh
//! is published mid-query.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::geom::Segment;
use crate::mesh::{Bounds, Mesh, MeshError, Purpose, Wall};

/// Identifier of a floor.
pub type FloorId = u32;

/// Published meshes for every (purpose, floor) pair.
#[derive(Debug, Default)]
pub struct MeshRegistry {
    meshes: HashMap<(Purpose, FloorId), Arc<Mesh>>,
}

impl MeshRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot for `purpose` on `floor`.
    #[must_use]
    pub fn get(&self, purpose: Purpose, floor: FloorId) -> Option<Arc<Mesh>> {
        self.meshes.get(&(purpose, floor)).cloned()
    }

    /// Publish a fully built mesh, replacing any previous one.
    pub fn publish(&mut self, purpose: Purpose, floor: FloorId, mesh: Mesh) -> Arc<Mesh> {
        let mesh = Arc::new(mesh);
        self.meshes.insert((purpose, floor), Arc::clone(&mesh));
        mesh
    }

    /// Build the `purpose` mesh for `floor` from the walls that block it and
    /// publish it. On failure the previously published mesh stays in place.
    ///
    /// # Errors
    ///
    /// Propagates [`MeshError`] from [`Mesh::build`].
    pub fn rebuild(
        &mut self,
        purpose: Purpose,
        floor: FloorId,
        bounds: &Bounds,
        walls: &[Wall],
    ) -> Result<Arc<Mesh>, MeshError> {
        let mesh = build_for(purpose, bounds, walls)?;
        info!(?purpose, floor, triangles = mesh.len(), "registry: mesh rebuilt");
        Ok(self.publish(purpose, floor, mesh))
    }

    /// Rebuild both the vision and movement meshes for `floor`. Nothing is
    /// published unless both build.
    ///
    /// # Errors
    ///
    /// Propagates the first [`MeshError`].
    pub fn rebuild_floor(&mut self, floor: FloorId, bounds: &Bounds, walls: &[Wall]) -> Result<(), MeshError> {
        let vision = build_for(Purpose::Vision, bounds, walls)?;
        let movement = build_for(Purpose::Movement, bounds, walls)?;
        info!(floor, vision = vision.len(), movement = movement.len(), "registry: floor rebuilt");
        self.publish(Purpose::Vision, floor, vision);
        self.publish(Purpose::Movement, floor, movement);
        Ok(())
    }

    /// Drop every mesh of `floor`.
    pub fn remove_floor(&mut self, floor: FloorId) {
        self.meshes.retain(|(_, f), _| *f != floor);
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }

    /// Number of published meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

fn build_for(purpose: Purpose, bounds: &Bounds, walls: &[Wall]) -> Result<Mesh, MeshError> {
    let segments: Vec<Segment> = walls.iter().filter(|w| w.blocks(purpose)).map(Wall::segment).collect();
    Mesh::build(bounds, &segments)
}
