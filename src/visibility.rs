//! Visibility polygons by triangular expansion.
//!
//! Starting from the observer's triangle, each edge is expanded into the
//! neighbouring triangle with a view cone bounded by two rays. The cone is
//! narrowed at every vertex it passes and split when the vertex falls inside
//! it. When a cone reaches a blocking edge (or the mesh boundary) the part of
//! that edge inside the cone is emitted. Cones are processed in angular
//! order, so the emitted points form a single counter-clockwise loop
//! (mathematical orientation; clockwise on a y-down canvas).

#[cfg(test)]
#[path = "visibility_test.rs"]
mod visibility_test;

use tracing::warn;

use crate::consts::{EXPANSION_SLACK, POINT_EPSILON};
use crate::geom::{Point, Sign, ccw, cw, orientation, ray_line_intersection};
use crate::mesh::{Mesh, Purpose, TriangleId};
use crate::registry::{FloorId, MeshRegistry};

/// A pending expansion through edge `edge` of `triangle`, limited to the
/// cone between the rays from the observer through `right` and `left`.
#[derive(Debug, Clone, Copy)]
struct Cone {
    triangle: TriangleId,
    edge: usize,
    right: Point,
    left: Point,
}

/// Visibility polygon of `observer` on `floor` using the `purpose` mesh.
///
/// Returns an empty polygon when the floor has no such mesh or the observer
/// lies outside it.
#[must_use]
pub fn compute_visibility(registry: &MeshRegistry, observer: Point, purpose: Purpose, floor: FloorId) -> Vec<Point> {
    match registry.get(purpose, floor) {
        Some(mesh) => visibility_polygon(&mesh, observer),
        None => Vec::new(),
    }
}

/// Boundary of everything visible from `observer` in `mesh`.
#[must_use]
pub fn visibility_polygon(mesh: &Mesh, observer: Point) -> Vec<Point> {
    let Some(start) = mesh.locate(observer, None) else {
        return Vec::new();
    };
    let Some(tri) = mesh.triangle(start) else {
        return Vec::new();
    };

    // Edges 0, 1, 2 run counter-clockwise around the triangle; pushed in
    // reverse so edge 0 is expanded first.
    let mut stack: Vec<Cone> = (0..3)
        .rev()
        .map(|edge| {
            let (right, left) = mesh.edge(tri, edge);
            Cone { triangle: start, edge, right, left }
        })
        .collect();

    let limit = mesh.len().saturating_mul(mesh.len()).saturating_add(EXPANSION_SLACK);
    let mut steps = 0usize;
    let mut out: Vec<Point> = Vec::new();

    while let Some(cone) = stack.pop() {
        steps += 1;
        if steps > limit {
            warn!(steps, triangles = mesh.len(), "visibility: expansion limit reached");
            break;
        }
        let Some(tri) = mesh.triangle(cone.triangle) else {
            continue;
        };
        let (a, b) = mesh.edge(tri, cone.edge);

        let through = if tri.blocking[cone.edge] { None } else { tri.neighbours[cone.edge] };
        let Some(next_id) = through else {
            push_point(&mut out, ray_line_intersection(observer, cone.right, a, b));
            push_point(&mut out, ray_line_intersection(observer, cone.left, a, b));
            continue;
        };

        let Some(next) = mesh.triangle(next_id) else {
            continue;
        };
        let Some(j) = next.slot_of(cone.triangle) else {
            continue;
        };
        let apex = mesh.point(next.vertices[j]);
        // In `next`, edge ccw(j) runs a → apex and edge cw(j) runs apex → b.
        let (near, far) = (ccw(j), cw(j));

        if orientation(observer, cone.right, apex) == Sign::RightTurn {
            stack.push(Cone { triangle: next_id, edge: far, ..cone });
        } else if orientation(observer, cone.left, apex) == Sign::LeftTurn {
            stack.push(Cone { triangle: next_id, edge: near, ..cone });
        } else {
            stack.push(Cone { triangle: next_id, edge: far, right: apex, left: cone.left });
            stack.push(Cone { triangle: next_id, edge: near, right: cone.right, left: apex });
        }
    }

    if out.len() > 1 && out[0].distance(out[out.len() - 1]) <= POINT_EPSILON {
        out.pop();
    }
    out
}

fn push_point(out: &mut Vec<Point>, p: Point) {
    if out.last().is_some_and(|last| last.distance(p) <= POINT_EPSILON) {
        return;
    }
    out.push(p);
}
