//! Light regions: visibility polygons clipped to an aura's reach and cone.
//!
//! A vision source lights the part of its visibility polygon that lies
//! within `value + dim` of the shape's center, optionally narrowed to a cone.
//! Intensity is full out to `value` and fades linearly to zero at
//! `value + dim`. Visibility polygons are star-shaped around the observer,
//! so both clips work in polar order around the center.

#[cfg(test)]
#[path = "lighting_test.rs"]
mod lighting_test;

use std::f64::consts::TAU;

use crate::aura::{Aura, AuraId};
use crate::config::LightingConfig;
use crate::consts::ANGLE_EPSILON;
use crate::geom::{Point, Vector, point_in_polygon, ray_line_intersection};
use crate::mesh::Purpose;
use crate::registry::MeshRegistry;
use crate::shape::{Shape, ShapeId, Viewer};
use crate::units::{UnitScale, to_radians};
use crate::visibility::compute_visibility;

/// Angular sector in radians, `sweep` counter-clockwise from `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub start: f64,
    pub sweep: f64,
}

impl Sector {
    /// Sector of `angle` degrees centered on `direction` degrees. `None`
    /// when the cone covers the full circle.
    #[must_use]
    pub fn from_aura(direction: f64, angle: f64) -> Option<Self> {
        if angle < 360.0 {
            Some(Self { start: to_radians(direction - angle / 2.0), sweep: to_radians(angle.max(0.0)) })
        } else {
            None
        }
    }

    /// Whether the direction `theta` (radians) falls inside the sector.
    #[must_use]
    pub fn contains(&self, theta: f64) -> bool {
        (theta - self.start).rem_euclid(TAU) <= self.sweep
    }
}

/// A lit area ready for a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct LitRegion {
    /// Shape the light belongs to.
    pub shape: ShapeId,
    /// Source aura; `None` for a token halo.
    pub aura: Option<AuraId>,
    /// Center of the light in world space.
    pub center: Point,
    /// Full-intensity radius in world units.
    pub inner_radius: f64,
    /// Zero-intensity radius in world units.
    pub outer_radius: f64,
    /// Lit area, counter-clockwise.
    pub polygon: Vec<Point>,
}

impl LitRegion {
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        point_in_polygon(&self.polygon, p)
    }

    /// Light intensity in `[0, 1]` at `p`.
    #[must_use]
    pub fn intensity_at(&self, p: Point) -> f64 {
        if !self.contains(p) {
            return 0.0;
        }
        falloff(self.center.distance(p), self.inner_radius, self.outer_radius)
    }
}

/// Whether `viewer` gets light from `aura` on `shape`: either the aura is
/// public or the viewer owns the shape with vision access.
#[must_use]
pub fn should_light(shape: &Shape, aura: &Aura, viewer: &Viewer) -> bool {
    aura.visible || shape.owned_by(viewer, true)
}

/// Linear falloff: 1 up to `inner`, 0 from `outer`. With `outer <= inner`
/// the edge is hard.
#[must_use]
pub fn falloff(distance: f64, inner: f64, outer: f64) -> f64 {
    if distance <= inner {
        1.0
    } else if distance >= outer {
        0.0
    } else {
        1.0 - (distance - inner) / (outer - inner)
    }
}

/// Whether `point` lies inside the cone of `angle` degrees around
/// `direction` degrees as seen from `observer`.
#[must_use]
pub fn in_cone(observer: Point, point: Point, direction: f64, angle: f64) -> bool {
    Sector::from_aura(direction, angle).is_none_or(|s| s.contains(observer.angle_to(point)))
}

/// Clip a visibility polygon around `observer` to a disc of `radius` and,
/// if given, an angular sector. Arcs are sampled every `arc_step_deg`.
#[must_use]
pub fn clip_polygon(
    observer: Point,
    polygon: &[Point],
    radius: f64,
    sector: Option<Sector>,
    arc_step_deg: f64,
) -> Vec<Point> {
    if polygon.len() < 3 || radius <= 0.0 || !radius.is_finite() {
        return Vec::new();
    }
    let step = to_radians(arc_step_deg.clamp(0.1, 90.0));
    let disc = clip_to_disc(observer, polygon, radius, step);
    match sector {
        Some(s) if s.sweep <= 0.0 => Vec::new(),
        Some(s) => clip_to_sector(observer, &disc, s),
        None => disc,
    }
}

/// Lit region of `aura` on `shape` for `viewer`, or `None` when the source
/// is gated, has no reach, or sees nothing.
#[must_use]
pub fn light_region(
    registry: &MeshRegistry,
    shape: &Shape,
    aura: &Aura,
    viewer: &Viewer,
    units: &UnitScale,
    config: &LightingConfig,
) -> Option<LitRegion> {
    if !should_light(shape, aura, viewer) {
        return None;
    }
    let value = aura.light_radius();
    let dim = aura.dim_radius();
    let outer_radius = units.unit_distance(value + dim);
    if outer_radius <= 0.0 {
        return None;
    }
    let center = shape.center();
    let visible = compute_visibility(registry, center, Purpose::Vision, shape.floor);
    let sector = Sector::from_aura(aura.direction, aura.angle);
    let polygon = clip_polygon(center, &visible, outer_radius, sector, config.arc_step_deg);
    if polygon.len() < 3 {
        return None;
    }
    Some(LitRegion {
        shape: shape.id,
        aura: Some(aura.uuid),
        center,
        inner_radius: units.unit_distance(value),
        outer_radius,
        polygon,
    })
}

/// Minimal vision around a token: a circle of `ratio` times the token's
/// width, fading out from half that radius. Walls are ignored.
#[must_use]
pub fn token_halo(shape: &Shape, config: &LightingConfig) -> Option<LitRegion> {
    let radius = config.token_halo_ratio * shape.width();
    if radius <= 0.0 || !radius.is_finite() {
        return None;
    }
    let center = shape.center();
    let step = to_radians(config.arc_step_deg.clamp(0.1, 90.0));
    Some(LitRegion {
        shape: shape.id,
        aura: None,
        center,
        inner_radius: radius / 2.0,
        outer_radius: radius,
        polygon: circle(center, radius, step),
    })
}

// --- Polar clipping ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    Inside,
    Enter,
    Exit,
}

#[allow(clippy::cast_precision_loss)]
fn circle(center: Point, radius: f64, step: f64) -> Vec<Point> {
    let n = segments(TAU, step).max(8);
    (0..n).map(|k| center + Vector::from_angle(TAU * k as f64 / n as f64) * radius).collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn segments(sweep: f64, step: f64) -> usize {
    (sweep / step).ceil().max(1.0) as usize
}

/// Points strictly between `from` and `to` on the arc running
/// counter-clockwise around `center`.
fn arc_between(center: Point, radius: f64, from: Point, to: Point, step: f64, out: &mut Vec<Point>) {
    let start = center.angle_to(from);
    let sweep = (center.angle_to(to) - start).rem_euclid(TAU);
    let n = segments(sweep, step);
    for k in 1..n {
        #[allow(clippy::cast_precision_loss)]
        let theta = start + sweep * k as f64 / n as f64;
        out.push(center + Vector::from_angle(theta) * radius);
    }
}

/// Parameters `t1 <= t2` where `a + t (b - a)` meets the circle.
fn circle_roots(center: Point, radius: f64, a: Point, b: Point) -> Option<(f64, f64)> {
    let d = b - a;
    let f = a - center;
    let qa = d.dot(d);
    if qa == 0.0 {
        return None;
    }
    let qb = 2.0 * f.dot(d);
    let qc = f.dot(f) - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    Some(((-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa)))
}

fn clip_to_disc(center: Point, polygon: &[Point], radius: f64, step: f64) -> Vec<Point> {
    let r2 = radius * radius;
    let inside = |p: Point| {
        let v = p - center;
        v.dot(v) <= r2
    };

    let mut events: Vec<(Point, Crossing)> = Vec::new();
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        let (in_a, in_b) = (inside(a), inside(b));
        if in_a {
            events.push((a, Crossing::Inside));
        }
        let Some((t1, t2)) = circle_roots(center, radius, a, b) else {
            continue;
        };
        let at = |t: f64| a + (b - a) * t.clamp(0.0, 1.0);
        match (in_a, in_b) {
            (true, false) => events.push((at(t2), Crossing::Exit)),
            (false, true) => events.push((at(t1), Crossing::Enter)),
            (false, false) if t1 > 0.0 && t2 < 1.0 && t1 < t2 => {
                events.push((at(t1), Crossing::Enter));
                events.push((at(t2), Crossing::Exit));
            }
            _ => {}
        }
    }

    if events.is_empty() {
        // Nothing of the polygon reaches into the disc, so the disc lies
        // wholly inside the polygon.
        return if point_in_polygon(polygon, center) { circle(center, radius, step) } else { Vec::new() };
    }

    let mut out: Vec<Point> = Vec::with_capacity(events.len());
    let mut pending_exit: Option<Point> = None;
    for &(p, kind) in &events {
        match kind {
            Crossing::Inside => out.push(p),
            Crossing::Exit => {
                out.push(p);
                pending_exit = Some(p);
            }
            Crossing::Enter => {
                if let Some(exit) = pending_exit.take() {
                    arc_between(center, radius, exit, p, step, &mut out);
                }
                out.push(p);
            }
        }
    }
    // The last exit wraps around to the first entry.
    if let Some(exit) = pending_exit
        && let Some(&first) = out.first()
    {
        arc_between(center, radius, exit, first, step, &mut out);
    }
    out.dedup();
    out
}

/// Boundary point of a star-shaped polygon in direction `theta`, on the
/// edge `a → b` that spans it.
fn boundary_at(center: Point, theta: f64, a: Point, b: Point) -> Point {
    ray_line_intersection(center, center + Vector::from_angle(theta), a, b)
}

fn clip_to_sector(center: Point, polygon: &[Point], sector: Sector) -> Vec<Point> {
    let n = polygon.len();
    if n < 3 {
        return Vec::new();
    }
    // Angles within ANGLE_EPSILON of a full turn lie on the start ray.
    let rel: Vec<f64> = polygon
        .iter()
        .map(|&p| {
            let r = (center.angle_to(p) - sector.start).rem_euclid(TAU);
            if r >= TAU - ANGLE_EPSILON { 0.0 } else { r }
        })
        .collect();

    // Shadow edges run along rays from the center, so their ends may step
    // back by rounding noise. The edge crossing the start ray is the one
    // with the largest drop.
    let fall = |i: usize| rel[i] - rel[(i + 1) % n];
    let Some(wrap) = (0..n).filter(|&i| fall(i) > 0.0).max_by(|&a, &b| fall(a).total_cmp(&fall(b))) else {
        return polygon.to_vec();
    };
    let first = (wrap + 1) % n;

    let start = if rel[first] <= ANGLE_EPSILON {
        polygon[first]
    } else {
        boundary_at(center, sector.start, polygon[wrap], polygon[first])
    };
    let end_theta = sector.start + sector.sweep;

    let mut out = vec![center, start];
    let mut prev = wrap;
    let mut closed = false;
    for j in 0..n {
        let idx = (first + j) % n;
        if rel[idx] > sector.sweep + ANGLE_EPSILON {
            let end = if rel[prev] >= sector.sweep - ANGLE_EPSILON && prev != wrap {
                polygon[prev]
            } else {
                boundary_at(center, end_theta, polygon[prev], polygon[idx])
            };
            out.push(end);
            closed = true;
            break;
        }
        out.push(polygon[idx]);
        prev = idx;
    }
    if !closed {
        out.push(boundary_at(center, end_theta, polygon[wrap], polygon[first]));
    }
    out.dedup();
    out
}
