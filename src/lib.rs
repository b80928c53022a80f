//! Fog-of-war vision and wall collision for multi-floor tabletop maps.
//!
//! Each floor's walls are triangulated into a constrained Delaunay mesh, one
//! for sight and one for movement. The vision mesh answers "what can be seen
//! from here" as a visibility polygon, which [`lighting`] clips to an aura's
//! radius and cone. The movement mesh shrinks drag deltas so shapes slide
//! along walls instead of passing through them. Meshes are rebuilt whole and
//! shared as immutable snapshots through the [`registry`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Scene engine: floors, walls, shapes and queries |
//! | [`geom`] | Points, vectors, orientation and segment intersection |
//! | [`mesh`] | Arena triangle mesh built from wall segments |
//! | [`locate`] | Point location by walking the mesh |
//! | [`visibility`] | Visibility polygons by triangular expansion |
//! | [`collision`] | Wall-sliding movement resolution |
//! | [`registry`] | Published meshes per purpose and floor |
//! | [`lighting`] | Radius, falloff, cone and gating of light sources |
//! | [`aura`] | Aura records and their wire form |
//! | [`shape`] | Shapes, ownership and the shape store |
//! | [`units`] | Camera transform, unit scale and grid snapping |
//! | [`config`] | Tuning knobs with defaults and env overrides |
//! | [`consts`] | Shared numeric constants (damping, grid size, etc.) |

pub mod aura;
pub mod collision;
pub mod config;
pub mod consts;
pub mod engine;
pub mod geom;
pub mod lighting;
pub mod locate;
pub mod mesh;
pub mod registry;
pub mod shape;
pub mod units;
pub mod visibility;
