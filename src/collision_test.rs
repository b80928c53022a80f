#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::geom::Segment;
use crate::mesh::{Bounds, Wall};

const EPSILON: f64 = 1e-9;

fn room() -> Bounds {
    Bounds::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0))
}

fn mesh_with(walls: &[Segment]) -> Mesh {
    Mesh::build(&room(), walls).unwrap()
}

fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> Segment {
    Segment::new(Point::new(ax, ay), Point::new(bx, by))
}

fn vec_approx_eq(a: Vector, b: Vector) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

fn resolve_point(mesh: &Mesh, point: Point, delta: Vector) -> Vector {
    resolve_delta(mesh, &CollisionConfig::default(), delta, point, &[point], false)
}

// =============================================================
// Fast paths
// =============================================================

#[test]
fn zero_delta_is_identity() {
    let mesh = mesh_with(&[seg(50.0, 0.0, 50.0, 100.0)]);
    let shape = Shape::rect(0, Point::new(40.0, 40.0), 8.0, 8.0);
    let config = CollisionConfig::default();
    assert_eq!(resolve_delta(&mesh, &config, Vector::ZERO, shape.center(), &shape.points, true), Vector::ZERO);
    assert_eq!(calculate_delta(&MeshRegistry::new(), &config, Vector::ZERO, &shape, false), Vector::ZERO);
}

#[test]
fn missing_mesh_leaves_delta_unchanged() {
    let shape = Shape::rect(7, Point::new(40.0, 40.0), 8.0, 8.0);
    let delta = Vector::new(500.0, -20.0);
    assert_eq!(calculate_delta(&MeshRegistry::new(), &CollisionConfig::default(), delta, &shape, false), delta);
}

#[test]
fn open_floor_passes_through() {
    let mesh = mesh_with(&[]);
    let delta = Vector::new(30.0, 25.0);
    assert_eq!(resolve_point(&mesh, Point::new(20.0, 20.0), delta), delta);
}

#[test]
fn point_outside_mesh_contributes_nothing() {
    let mesh = mesh_with(&[]);
    let delta = Vector::new(50.0, 0.0);
    assert_eq!(resolve_point(&mesh, Point::new(-10.0, 50.0), delta), delta);
}

// =============================================================
// Walls
// =============================================================

#[test]
fn perpendicular_wall_damps_to_wall_distance() {
    let mesh = mesh_with(&[seg(50.0, 0.0, 50.0, 100.0)]);
    let resolved = resolve_point(&mesh, Point::new(40.0, 50.0), Vector::new(20.0, 0.0));
    assert!(vec_approx_eq(resolved, Vector::new(8.0, 0.0)), "{resolved:?}");
}

#[test]
fn short_damped_step_snaps_to_zero() {
    let mesh = mesh_with(&[seg(50.0, 0.0, 50.0, 100.0)]);
    // 0.8 * 1 < 1 world unit
    let resolved = resolve_point(&mesh, Point::new(49.0, 50.0), Vector::new(20.0, 0.0));
    assert_eq!(resolved, Vector::ZERO);
}

#[test]
fn diagonal_move_keeps_parallel_component() {
    let mesh = mesh_with(&[seg(0.0, 50.0, 100.0, 50.0)]);
    let resolved = resolve_point(&mesh, Point::new(50.0, 40.0), Vector::new(10.0, 20.0));
    assert!(vec_approx_eq(resolved, Vector::new(4.0, 8.0)), "{resolved:?}");
    assert!(resolved.x > 0.0);
}

#[test]
fn most_restrictive_point_wins() {
    let mesh = mesh_with(&[seg(50.0, 0.0, 50.0, 100.0)]);
    let shape = Shape::rect(0, Point::new(30.0, 40.0), 15.0, 10.0);
    let resolved = resolve_delta(
        &mesh,
        &CollisionConfig::default(),
        Vector::new(20.0, 0.0),
        shape.center(),
        &shape.points,
        false,
    );
    // Right edge sits at x = 45, five units from the wall.
    assert!(vec_approx_eq(resolved, Vector::new(4.0, 0.0)), "{resolved:?}");
}

#[test]
fn shrink_moves_points_toward_center() {
    let mesh = mesh_with(&[seg(50.0, 0.0, 50.0, 100.0)]);
    let shape = Shape::rect(0, Point::new(40.0, 40.0), 8.0, 8.0);
    let config = CollisionConfig::default();
    let delta = Vector::new(20.0, 0.0);
    let plain = resolve_delta(&mesh, &config, delta, shape.center(), &shape.points, false);
    let shrunk = resolve_delta(&mesh, &config, delta, shape.center(), &shape.points, true);
    // Edge at 48 (2 from the wall) vs inset edge at 45 (5 from the wall).
    assert!(vec_approx_eq(plain, Vector::new(1.6, 0.0)), "{plain:?}");
    assert!(vec_approx_eq(shrunk, Vector::new(4.0, 0.0)), "{shrunk:?}");
}

#[test]
fn never_longer_than_requested() {
    let mesh = mesh_with(&[seg(50.0, 0.0, 50.0, 100.0), seg(10.0, 70.0, 90.0, 70.0), seg(20.0, 20.0, 35.0, 35.0)]);
    let shape = Shape::rect(0, Point::new(38.0, 40.0), 6.0, 6.0);
    let config = CollisionConfig::default();
    for &(dx, dy) in &[(30.0, 0.0), (-30.0, 0.0), (0.0, 40.0), (0.0, -50.0), (25.0, 35.0), (-25.0, -25.0), (0.5, 0.0)] {
        let delta = Vector::new(dx, dy);
        for shrink in [false, true] {
            let resolved = resolve_delta(&mesh, &config, delta, shape.center(), &shape.points, shrink);
            assert!(resolved.length() <= delta.length() + EPSILON, "{delta:?} -> {resolved:?}");
        }
    }
}

// =============================================================
// Flush against a wall
// =============================================================

#[test]
fn leaving_the_boundary_is_not_blocked() {
    let mesh = mesh_with(&[]);
    let resolved = resolve_point(&mesh, Point::new(50.0, 0.0), Vector::new(0.0, 150.0));
    assert!(vec_approx_eq(resolved, Vector::new(0.0, 80.0)), "{resolved:?}");
}

#[test]
fn pushing_into_the_boundary_freezes() {
    let mesh = mesh_with(&[]);
    let resolved = resolve_point(&mesh, Point::new(50.0, 0.0), Vector::new(0.0, -10.0));
    assert_eq!(resolved, Vector::ZERO);
}

#[test]
fn sliding_along_a_wall_is_free() {
    let mesh = mesh_with(&[seg(0.0, 50.0, 100.0, 50.0)]);
    let delta = Vector::new(10.0, 0.0);
    assert_eq!(resolve_point(&mesh, Point::new(50.0, 50.0), delta), delta);
}

// =============================================================
// Registry
// =============================================================

#[test]
fn calculate_delta_uses_movement_mesh_only() {
    let mut registry = MeshRegistry::new();
    let walls = [Wall { a: Point::new(50.0, 0.0), b: Point::new(50.0, 100.0), blocks_vision: true, blocks_movement: false }];
    registry.rebuild_floor(0, &room(), &walls).unwrap();
    let shape = Shape::new(0, vec![Point::new(40.0, 50.0)]);
    let delta = Vector::new(20.0, 0.0);
    assert_eq!(calculate_delta(&registry, &CollisionConfig::default(), delta, &shape, false), delta);

    let walls = [Wall::solid(Point::new(50.0, 0.0), Point::new(50.0, 100.0))];
    registry.rebuild_floor(0, &room(), &walls).unwrap();
    let resolved = calculate_delta(&registry, &CollisionConfig::default(), delta, &shape, false);
    assert!(vec_approx_eq(resolved, Vector::new(8.0, 0.0)), "{resolved:?}");
}

#[test]
fn damping_comes_from_config() {
    let mesh = mesh_with(&[seg(50.0, 0.0, 50.0, 100.0)]);
    let config = CollisionConfig { damping: 0.5, ..CollisionConfig::default() };
    let point = Point::new(40.0, 50.0);
    let resolved = resolve_delta(&mesh, &config, Vector::new(20.0, 0.0), point, &[point], false);
    assert!(vec_approx_eq(resolved, Vector::new(5.0, 0.0)), "{resolved:?}");
}
