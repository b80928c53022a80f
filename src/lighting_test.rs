#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::f64::consts::PI;

use uuid::Uuid;

use super::*;
use crate::geom::signed_area;
use crate::mesh::{Bounds, Wall};
use crate::shape::ShapeOwner;

const EPSILON: f64 = 1e-9;

fn square() -> Vec<Point> {
    vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0), Point::new(0.0, 100.0)]
}

fn registry() -> MeshRegistry {
    let mut registry = MeshRegistry::new();
    registry
        .rebuild_floor(0, &Bounds::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0)), &[])
        .unwrap();
    registry
}

fn make_aura(value: f64, dim: f64, angle: f64, direction: f64) -> Aura {
    Aura {
        uuid: Uuid::new_v4(),
        active: true,
        vision_source: true,
        visible: false,
        name: "light".into(),
        value,
        dim,
        colour: String::new(),
        border_colour: String::new(),
        angle,
        direction,
        temporary: false,
    }
}

fn token() -> Shape {
    Shape::rect(0, Point::new(45.0, 45.0), 10.0, 10.0)
}

fn units() -> UnitScale {
    UnitScale { unit_size: 5.0, grid_size: 50.0 }
}

fn region_for(shape: &Shape, aura: &Aura, viewer: &Viewer) -> Option<LitRegion> {
    light_region(&registry(), shape, aura, viewer, &units(), &LightingConfig::default())
}

// =============================================================
// Falloff and cones
// =============================================================

#[test]
fn falloff_is_linear_between_radii() {
    assert_eq!(falloff(5.0, 10.0, 20.0), 1.0);
    assert_eq!(falloff(10.0, 10.0, 20.0), 1.0);
    assert!((falloff(15.0, 10.0, 20.0) - 0.5).abs() < EPSILON);
    assert_eq!(falloff(20.0, 10.0, 20.0), 0.0);
}

#[test]
fn falloff_without_dim_is_hard() {
    assert_eq!(falloff(9.99, 10.0, 10.0), 1.0);
    assert_eq!(falloff(10.01, 10.0, 10.0), 0.0);
}

#[test]
fn cone_excludes_opposite_direction() {
    let o = Point::new(0.0, 0.0);
    assert!(in_cone(o, Point::new(10.0, 0.0), 0.0, 90.0));
    assert!(in_cone(o, Point::new(10.0, -9.0), 0.0, 90.0));
    assert!(!in_cone(o, Point::new(-10.0, 0.0), 0.0, 90.0));
    assert!(!in_cone(o, Point::new(0.0, 10.0), 0.0, 90.0));
}

#[test]
fn full_circle_has_no_sector() {
    assert!(Sector::from_aura(0.0, 360.0).is_none());
    assert!(Sector::from_aura(0.0, 400.0).is_none());
    assert!(in_cone(Point::new(0.0, 0.0), Point::new(-10.0, 0.0), 0.0, 360.0));
}

#[test]
fn sector_wraps_past_pi() {
    let s = Sector::from_aura(180.0, 60.0).unwrap();
    assert!(s.contains(PI));
    assert!(s.contains(-PI + 0.1));
    assert!(!s.contains(0.0));
}

// =============================================================
// Disc clipping
// =============================================================

#[test]
fn small_disc_inside_room_is_a_circle() {
    let center = Point::new(50.0, 50.0);
    let clipped = clip_polygon(center, &square(), 20.0, None, 5.0);
    assert!(clipped.len() >= 8);
    for p in &clipped {
        assert!((center.distance(*p) - 20.0).abs() < EPSILON);
    }
    let area = signed_area(&clipped);
    assert!((area - PI * 400.0).abs() / (PI * 400.0) < 0.01, "area {area}");
}

#[test]
fn large_disc_keeps_polygon() {
    let clipped = clip_polygon(Point::new(50.0, 50.0), &square(), 1000.0, None, 5.0);
    assert_eq!(clipped, square());
}

#[test]
fn wall_cuts_the_disc() {
    let center = Point::new(10.0, 50.0);
    let clipped = clip_polygon(center, &square(), 20.0, None, 5.0);
    for p in &clipped {
        assert!(center.distance(*p) <= 20.0 + EPSILON);
        assert!(p.x >= -EPSILON);
    }
    // Circle minus the segment beyond x = 0.
    let theta = 2.0 * (10.0_f64 / 20.0).acos();
    let expected = PI * 400.0 - 200.0 * (theta - theta.sin());
    let area = signed_area(&clipped);
    assert!(area > 0.0);
    assert!((area - expected).abs() / expected < 0.02, "area {area} expected {expected}");
}

#[test]
fn bad_radius_is_empty() {
    let center = Point::new(50.0, 50.0);
    assert!(clip_polygon(center, &square(), 0.0, None, 5.0).is_empty());
    assert!(clip_polygon(center, &square(), f64::NAN, None, 5.0).is_empty());
    assert!(clip_polygon(center, &[], 10.0, None, 5.0).is_empty());
}

// =============================================================
// Sector clipping
// =============================================================

#[test]
fn quarter_cone_facing_east() {
    let observer = Point::new(40.0, 50.0);
    let clipped = clip_polygon(observer, &square(), 1000.0, Sector::from_aura(0.0, 90.0), 5.0);
    assert!((signed_area(&clipped) - 3500.0).abs() < 1e-6, "area {}", signed_area(&clipped));
    assert_eq!(clipped[0], observer);
    assert!(point_in_polygon(&clipped, Point::new(95.0, 50.0)));
    assert!(!point_in_polygon(&clipped, Point::new(10.0, 50.0)));
}

#[test]
fn narrow_cone_between_corners() {
    let observer = Point::new(50.0, 50.0);
    let clipped = clip_polygon(observer, &square(), 1000.0, Sector::from_aura(10.0, 60.0), 5.0);
    let expected = 0.5 * 50.0 * 50.0 * (40.0_f64.to_radians().tan() + 20.0_f64.to_radians().tan());
    assert!((signed_area(&clipped) - expected).abs() < 1e-6);
}

#[test]
fn zero_angle_cone_is_empty() {
    assert!(clip_polygon(Point::new(50.0, 50.0), &square(), 20.0, Sector::from_aura(0.0, 0.0), 5.0).is_empty());
}

#[test]
fn shadow_edge_rounding_keeps_cone_lit() {
    // The first edge runs along the 45 degree ray; its far end's angle rounds just below its near end's.
    let observer = Point::new(0.0, 0.0);
    let polygon = vec![
        Point::new(10.0, 10.0),
        Point::new(20.0, 20.0 - 1e-13),
        Point::new(-20.0, 20.0),
        Point::new(-20.0, -20.0),
        Point::new(10.0, -10.0),
    ];
    let clipped = clip_polygon(observer, &polygon, 1000.0, Sector::from_aura(90.0, 120.0), 5.0);
    let tan30 = 30.0_f64.to_radians().tan();
    let expected = 650.0 - 250.0 * tan30;
    assert!((signed_area(&clipped) - expected).abs() < 1e-6, "area {}", signed_area(&clipped));
    assert!(point_in_polygon(&clipped, Point::new(0.0, 15.0)));
    assert!(point_in_polygon(&clipped, Point::new(12.0, 14.0)));
    assert!(!point_in_polygon(&clipped, Point::new(0.0, -5.0)));
    assert!(!point_in_polygon(&clipped, Point::new(-15.0, 5.0)));
}

// =============================================================
// Light regions
// =============================================================

#[test]
fn owner_light_has_falloff() {
    let shape = token();
    let aura = make_aura(1.0, 1.0, 360.0, 0.0);
    let region = region_for(&shape, &aura, &Viewer::dm("gm")).unwrap();
    assert_eq!(region.center, Point::new(50.0, 50.0));
    assert_eq!(region.inner_radius, 10.0);
    assert_eq!(region.outer_radius, 20.0);
    assert_eq!(region.aura, Some(aura.uuid));
    assert_eq!(region.intensity_at(Point::new(50.0, 50.0)), 1.0);
    assert!((region.intensity_at(Point::new(65.0, 50.0)) - 0.5).abs() < EPSILON);
    assert_eq!(region.intensity_at(Point::new(80.0, 50.0)), 0.0);
}

#[test]
fn cone_light_hides_points_behind() {
    let shape = token();
    let aura = make_aura(1.0, 1.0, 90.0, 0.0);
    let region = region_for(&shape, &aura, &Viewer::dm("gm")).unwrap();
    assert!(region.contains(Point::new(60.0, 50.0)));
    assert!(!region.contains(Point::new(40.0, 50.0)));
}

#[test]
fn cone_light_across_wall_shadow() {
    let mut registry = MeshRegistry::new();
    let wall = Wall::solid(Point::new(60.0, 45.0), Point::new(60.0, 55.0));
    registry
        .rebuild_floor(0, &Bounds::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0)), &[wall])
        .unwrap();
    let aura = make_aura(3.5, 1.0, 90.0, 0.0);
    let region = light_region(&registry, &token(), &aura, &Viewer::dm("gm"), &units(), &LightingConfig::default())
        .unwrap();
    assert!((region.outer_radius - 45.0).abs() < EPSILON);
    assert!(region.contains(Point::new(55.0, 52.0)));
    assert!(region.contains(Point::new(75.0, 30.0)));
    assert!(region.contains(Point::new(75.0, 70.0)));
    // Behind the wall.
    assert!(!region.contains(Point::new(80.0, 50.0)));
    // Behind the observer.
    assert!(!region.contains(Point::new(30.0, 50.0)));
}

#[test]
fn gating_by_ownership_and_visibility() {
    let mut shape = token();
    let aura = make_aura(1.0, 0.0, 360.0, 0.0);
    let bob = Viewer::player("bob");
    assert!(region_for(&shape, &aura, &bob).is_none());

    let public = Aura { visible: true, ..aura.clone() };
    assert!(region_for(&shape, &public, &bob).is_some());

    shape.owners.push(ShapeOwner { user: "bob".into(), vision_access: true });
    assert!(region_for(&shape, &aura, &bob).is_some());
}

#[test]
fn degenerate_radii_light_nothing() {
    let shape = token();
    let gm = Viewer::dm("gm");
    assert!(region_for(&shape, &make_aura(0.0, 0.0, 360.0, 0.0), &gm).is_none());
    assert!(region_for(&shape, &make_aura(f64::NAN, -4.0, 360.0, 0.0), &gm).is_none());
    // A NaN full radius still lights the dim ring.
    let region = region_for(&shape, &make_aura(f64::NAN, 1.0, 360.0, 0.0), &gm).unwrap();
    assert_eq!(region.inner_radius, 0.0);
    assert_eq!(region.outer_radius, 10.0);
}

#[test]
fn missing_mesh_lights_nothing() {
    let mut shape = token();
    shape.floor = 9;
    assert!(region_for(&shape, &make_aura(1.0, 1.0, 360.0, 0.0), &Viewer::dm("gm")).is_none());
}

// =============================================================
// Token halo
// =============================================================

#[test]
fn halo_scales_with_token_width() {
    let halo = token_halo(&token(), &LightingConfig::default()).unwrap();
    assert_eq!(halo.outer_radius, 8.0);
    assert_eq!(halo.inner_radius, 4.0);
    assert!(halo.aura.is_none());
    assert!(halo.contains(Point::new(55.0, 50.0)));
    assert!(!halo.contains(Point::new(60.0, 50.0)));
}

#[test]
fn pointless_token_has_no_halo() {
    assert!(token_halo(&Shape::new(0, Vec::new()), &LightingConfig::default()).is_none());
}
