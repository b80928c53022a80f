//! Movement collision: shrink a drag delta so a shape never crosses a
//! blocking edge of its floor's movement mesh.
//!
//! Every outline point walks the mesh along its own movement segment. Walls
//! hit along the way shorten the delta to a damped fraction of the distance
//! to the wall; the shortest delta over all points wins and is applied to the
//! whole shape as one rigid translation. Only the blocked points constrain
//! the move, so a shape pushed diagonally into a wall keeps sliding along it.

#[cfg(test)]
#[path = "collision_test.rs"]
mod collision_test;

use std::collections::HashSet;

use tracing::debug;

use crate::config::CollisionConfig;
use crate::geom::{Point, Sign, Vector, intersection, orientation};
use crate::mesh::{Mesh, Purpose, TriangleId};
use crate::registry::MeshRegistry;
use crate::shape::Shape;

/// Largest part of `delta` that `shape` can move on its floor.
///
/// A zero delta comes back unchanged, as does any delta on a floor without a
/// movement mesh. With `shrink` the outline is first pulled toward the
/// center, letting the shape overlap walls by that margin.
#[must_use]
pub fn calculate_delta(
    registry: &MeshRegistry,
    config: &CollisionConfig,
    delta: Vector,
    shape: &Shape,
    shrink: bool,
) -> Vector {
    if delta.is_zero() {
        return delta;
    }
    let Some(mesh) = registry.get(Purpose::Movement, shape.floor) else {
        return delta;
    };
    let resolved = resolve_delta(&mesh, config, delta, shape.center(), &shape.points, shrink);
    if resolved != delta {
        debug!(shape = %shape.id, dx = delta.x, dy = delta.y, rx = resolved.x, ry = resolved.y, "collision: delta restricted");
    }
    resolved
}

/// Resolve `delta` for the outline `points` around `center` against `mesh`.
///
/// Points outside the mesh contribute no constraint.
#[must_use]
pub fn resolve_delta(
    mesh: &Mesh,
    config: &CollisionConfig,
    mut delta: Vector,
    center: Point,
    points: &[Point],
    shrink: bool,
) -> Vector {
    if delta.is_zero() {
        return delta;
    }
    let hint = mesh.locate(center, None);
    for &p in points {
        let point = if shrink { p + (center - p) * config.shrink_inset } else { p };
        let Some(start) = mesh.locate(point, hint) else {
            continue;
        };
        delta = check_triangle(mesh, config, point, start, delta);
    }
    delta
}

/// Walk from `start` along `point → point + delta` until the endpoint is
/// reached or no unvisited edge is crossed, shortening `delta` at every
/// blocking edge hit on the way.
fn check_triangle(mesh: &Mesh, config: &CollisionConfig, point: Point, start: TriangleId, mut delta: Vector) -> Vector {
    let mut visited: HashSet<TriangleId> = HashSet::new();
    let mut current = start;

    loop {
        let endpoint = point + delta;
        if mesh.contains(current, endpoint) {
            return delta;
        }
        visited.insert(current);
        let Some(tri) = mesh.triangle(current) else {
            return delta;
        };

        let mut next = None;
        for i in 0..3 {
            if tri.neighbours[i].is_some_and(|n| visited.contains(&n)) {
                continue;
            }
            let (edge_ccw, edge_cw) = mesh.edge(tri, i);
            let Some(ix) = intersection(point, endpoint, edge_cw, edge_ccw) else {
                continue;
            };

            if !tri.is_constrained(i)
                && let Some(n) = tri.neighbours[i]
            {
                next = Some(n);
                break;
            }

            // Starting flush against the wall: leaving it is allowed.
            if ix == point && matches!(orientation(point, endpoint, edge_ccw), Sign::LeftTurn | Sign::Zero) {
                continue;
            }

            let mut candidate = (ix - point) * config.damping;
            if candidate.length() < config.min_step {
                candidate = Vector::ZERO;
            }
            if candidate.length() < delta.length() {
                delta = candidate;
            }
        }

        match next {
            Some(n) => current = n,
            None => return delta,
        }
    }
}
