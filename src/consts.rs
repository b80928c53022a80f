//! Shared numeric constants for the geometry core.

// ── Collision ───────────────────────────────────────────────────

/// Fraction of the distance to a blocking edge that a resolved delta may cover.
pub const COLLISION_DAMPING: f64 = 0.8;

/// Resolved deltas shorter than this many world units snap to zero.
pub const MIN_STEP: f64 = 1.0;

/// How far outline points are pulled toward the shape center when shrinking.
pub const SHRINK_INSET: f64 = 0.75;

// ── Lighting ────────────────────────────────────────────────────

/// Largest angular step, in degrees, between samples on a clipped light arc.
pub const ARC_STEP_DEG: f64 = 5.0;

/// Angles, in radians, closer than this to a cone edge count as on it.
pub const ANGLE_EPSILON: f64 = 1e-9;

/// Radius of the minimal token vision halo as a fraction of the token width.
pub const TOKEN_HALO_RATIO: f64 = 0.8;

// ── Units ───────────────────────────────────────────────────────

/// World size of one grid cell.
pub const DEFAULT_GRID_SIZE: f64 = 50.0;

/// Game units (e.g. feet) covered by one grid cell.
pub const DEFAULT_UNIT_SIZE: f64 = 5.0;

// ── Meshes ──────────────────────────────────────────────────────

/// Half-width of the default square floor domain, in world units.
pub const DEFAULT_FLOOR_EXTENT: f64 = 1.0e6;

/// Output points closer than this are merged.
pub const POINT_EPSILON: f64 = 1e-9;

/// Cone expansions allowed beyond the square of a mesh's triangle count
/// before a visibility query gives up.
pub const EXPANSION_SLACK: usize = 64;
