//! Geometry primitives: points, vectors, the orientation predicate and
//! segment intersection.
//!
//! Everything here works in world space. The orientation predicate uses the
//! usual mathematical convention (positive cross product is a left turn), so
//! on a y-down canvas a "left turn" appears clockwise on screen.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other - self).length()
    }

    /// Angle in radians of the direction from `self` to `other`.
    #[must_use]
    pub fn angle_to(self, other: Point) -> f64 {
        let d = other - self;
        d.y.atan2(d.x)
    }
}

/// A displacement in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `radians`.
    #[must_use]
    pub fn from_angle(radians: f64) -> Self {
        Self { x: radians.cos(), y: radians.sin() }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    #[must_use]
    pub fn dot(self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product.
    #[must_use]
    pub fn cross(self, other: Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

/// A closed line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    #[must_use]
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }
}

/// Sign of the orientation predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    LeftTurn,
    RightTurn,
    Zero,
}

/// Orientation of `c` relative to the directed line `a → b`.
#[must_use]
pub fn orientation(a: Point, b: Point, c: Point) -> Sign {
    let det = (b - a).cross(c - a);
    if det > 0.0 {
        Sign::LeftTurn
    } else if det < 0.0 {
        Sign::RightTurn
    } else {
        Sign::Zero
    }
}

/// Next vertex index counter-clockwise within a triangle.
#[must_use]
pub fn ccw(i: usize) -> usize {
    (i + 1) % 3
}

/// Next vertex index clockwise within a triangle.
#[must_use]
pub fn cw(i: usize) -> usize {
    (i + 2) % 3
}

/// Intersection point of the closed segments `p1 → p2` and `q1 → q2`.
///
/// Parallel (including collinear) and disjoint segments yield `None`. The
/// result is computed along the first segment, so an intersection at its
/// start returns `p1` exactly.
#[must_use]
pub fn intersection(p1: Point, p2: Point, q1: Point, q2: Point) -> Option<Point> {
    let r = p2 - p1;
    let s = q2 - q1;
    let denom = r.cross(s);
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    let qp = q1 - p1;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    if t == 0.0 {
        return Some(p1);
    }
    Some(p1 + r * t)
}

/// Intersection of the line through `from → through` with the line through
/// `a → b`. Falls back to `through` when the lines are parallel.
#[must_use]
pub fn ray_line_intersection(from: Point, through: Point, a: Point, b: Point) -> Point {
    if through == a || through == b {
        return through;
    }
    let d = through - from;
    let e = b - a;
    let denom = d.cross(e);
    if denom.abs() <= f64::EPSILON * d.length() * e.length() {
        return through;
    }
    let t = (a - from).cross(e) / denom;
    from + d * t
}

/// Even-odd point-in-polygon test. Points on the boundary may land on
/// either side.
#[must_use]
pub fn point_in_polygon(polygon: &[Point], p: Point) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Signed area via the shoelace formula; positive for counter-clockwise
/// (mathematical orientation) polygons.
#[must_use]
pub fn signed_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[(i + 1) % n]);
        twice += a.x * b.y - b.x * a.y;
    }
    twice / 2.0
}
