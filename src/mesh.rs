//! Arena triangle mesh of a floor's free space.
//!
//! A [`Mesh`] is a constrained Delaunay triangulation of the floor bounds with
//! every wall inserted as a constraint edge. Triangles live in a flat arena and
//! refer to vertices and neighbours by index, so the cyclic neighbour graph
//! needs no shared ownership. Meshes are immutable once built; the
//! [`crate::registry::MeshRegistry`] replaces them wholesale.
//!
//! Construction is delegated to `spade`'s CDT and then flattened into the
//! arena. Slot `i` of a triangle's `neighbours` and `blocking` arrays refers
//! to the edge opposite vertex `i`, which runs from vertex `ccw(i)` to vertex
//! `cw(i)`. Vertices are stored counter-clockwise (mathematical orientation).

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2, Triangulation};
use tracing::{debug, warn};

use crate::consts::{DEFAULT_FLOOR_EXTENT, POINT_EPSILON};
use crate::geom::{Point, Segment, Sign, ccw, cw, intersection, orientation};

/// Index of a vertex in a mesh.
pub type VertexId = usize;

/// Index of a triangle in a mesh.
pub type TriangleId = usize;

type Cdt = ConstrainedDelaunayTriangulation<Point2<f64>>;

/// Error returned by [`Mesh::build`].
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// The floor bounds enclose no area or are not finite.
    #[error("degenerate floor bounds: ({min_x}, {min_y}) .. ({max_x}, {max_y})")]
    DegenerateBounds { min_x: f64, min_y: f64, max_x: f64, max_y: f64 },
    /// A wall endpoint is NaN or infinite.
    #[error("non-finite wall coordinate: ({x}, {y})")]
    NonFinite { x: f64, y: f64 },
    /// The triangulation rejected a vertex.
    #[error("vertex insertion failed at ({x}, {y}): {reason:?}")]
    Insertion { x: f64, y: f64, reason: InsertionError },
}

/// What a mesh's blocking edges stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Blocking edges stop light.
    Vision,
    /// Blocking edges stop shape movement.
    Movement,
}

impl Purpose {
    pub const ALL: [Purpose; 2] = [Purpose::Vision, Purpose::Movement];
}

/// A wall segment on a floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub a: Point,
    pub b: Point,
    #[serde(default = "default_true")]
    pub blocks_vision: bool,
    #[serde(default = "default_true")]
    pub blocks_movement: bool,
}

fn default_true() -> bool {
    true
}

impl Wall {
    /// A wall that blocks both light and movement.
    #[must_use]
    pub fn solid(a: Point, b: Point) -> Self {
        Self { a, b, blocks_vision: true, blocks_movement: true }
    }

    /// Whether this wall takes part in the mesh for `purpose`.
    #[must_use]
    pub fn blocks(&self, purpose: Purpose) -> bool {
        match purpose {
            Purpose::Vision => self.blocks_vision,
            Purpose::Movement => self.blocks_movement,
        }
    }

    #[must_use]
    pub fn segment(&self) -> Segment {
        Segment::new(self.a, self.b)
    }

    /// Expand a polyline into consecutive walls, closing it when `closed`.
    #[must_use]
    pub fn polyline(points: &[Point], closed: bool, blocks_vision: bool, blocks_movement: bool) -> Vec<Wall> {
        let mut walls: Vec<Wall> = points
            .windows(2)
            .map(|w| Wall { a: w[0], b: w[1], blocks_vision, blocks_movement })
            .collect();
        if closed && points.len() > 2 {
            if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
                walls.push(Wall { a: last, b: first, blocks_vision, blocks_movement });
            }
        }
        walls
    }
}

/// Axis-aligned playable area of a floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::square(DEFAULT_FLOOR_EXTENT)
    }
}

impl Bounds {
    #[must_use]
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Square centered on the origin with the given half-width.
    #[must_use]
    pub fn square(extent: f64) -> Self {
        Self { min: Point::new(-extent, -extent), max: Point::new(extent, extent) }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.x < self.max.x && self.min.y < self.max.y
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Corners in counter-clockwise order.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }

    /// Clip a segment to the bounds (Liang–Barsky). `None` when nothing of
    /// the segment lies inside.
    #[must_use]
    pub fn clip(&self, seg: Segment) -> Option<Segment> {
        let d = seg.b - seg.a;
        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;
        let checks = [
            (-d.x, seg.a.x - self.min.x),
            (d.x, self.max.x - seg.a.x),
            (-d.y, seg.a.y - self.min.y),
            (d.y, self.max.y - seg.a.y),
        ];
        for (p, q) in checks {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
        let a = if t0 == 0.0 { seg.a } else { seg.a + d * t0 };
        let b = if t1 == 1.0 { seg.b } else { seg.a + d * t1 };
        Some(Segment::new(a, b))
    }
}

/// One triangle of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Vertex indices, counter-clockwise.
    pub vertices: [VertexId; 3],
    /// Neighbour across the edge opposite each vertex; `None` on the mesh boundary.
    pub neighbours: [Option<TriangleId>; 3],
    /// Whether the edge opposite each vertex is blocking.
    pub blocking: [bool; 3],
}

impl Triangle {
    /// Whether the edge opposite vertex `i` is blocking.
    #[must_use]
    pub fn is_constrained(&self, i: usize) -> bool {
        self.blocking[i]
    }

    /// Slot whose neighbour is `other`.
    #[must_use]
    pub fn slot_of(&self, other: TriangleId) -> Option<usize> {
        self.neighbours.iter().position(|n| *n == Some(other))
    }
}

/// Triangulated free space of one floor for one [`Purpose`].
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Point>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// A mesh with no triangles; every point is outside it.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Triangulate `bounds` with every segment in `walls` as a blocking edge.
    ///
    /// Walls are clipped to the bounds and split where they cross each
    /// other. Zero-length walls are ignored. The bounds' outline is blocking.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::DegenerateBounds`] for empty or non-finite bounds,
    /// [`MeshError::NonFinite`] for NaN/infinite wall coordinates, and
    /// [`MeshError::Insertion`] if the triangulation rejects a vertex.
    pub fn build(bounds: &Bounds, walls: &[Segment]) -> Result<Self, MeshError> {
        if !bounds.is_valid() {
            return Err(MeshError::DegenerateBounds {
                min_x: bounds.min.x,
                min_y: bounds.min.y,
                max_x: bounds.max.x,
                max_y: bounds.max.y,
            });
        }
        for wall in walls {
            for p in [wall.a, wall.b] {
                if !p.is_finite() {
                    return Err(MeshError::NonFinite { x: p.x, y: p.y });
                }
            }
        }

        let mut cdt = Cdt::new();
        for corner in bounds.corners() {
            insert(&mut cdt, corner)?;
        }

        let clipped: Vec<Segment> = walls
            .iter()
            .filter_map(|w| {
                let clipped = bounds.clip(*w);
                if clipped.is_none() {
                    debug!(ax = w.a.x, ay = w.a.y, bx = w.b.x, by = w.b.y, "mesh: wall outside floor bounds");
                }
                clipped
            })
            .filter(|s| s.length() > 0.0)
            .collect();

        let mut skipped = 0usize;
        for piece in split_crossings(&clipped) {
            let from = insert(&mut cdt, piece.a)?;
            let to = insert(&mut cdt, piece.b)?;
            if from == to {
                continue;
            }
            if cdt.can_add_constraint(from, to) {
                cdt.add_constraint(from, to);
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            warn!(skipped, "mesh: constraints crossing existing walls were dropped");
        }

        let mesh = Self::from_cdt(&cdt);
        debug!(
            vertices = mesh.vertices.len(),
            triangles = mesh.triangles.len(),
            walls = walls.len(),
            "mesh: built"
        );
        Ok(mesh)
    }

    /// Flatten a spade triangulation into the arena representation.
    fn from_cdt(cdt: &Cdt) -> Self {
        let mut vertices = vec![Point::new(0.0, 0.0); cdt.num_vertices()];
        for v in cdt.vertices() {
            let p = v.position();
            vertices[v.fix().index()] = Point::new(p.x, p.y);
        }

        let face_ids: HashMap<FixedFaceHandle<InnerTag>, TriangleId> =
            cdt.inner_faces().enumerate().map(|(i, f)| (f.fix(), i)).collect();

        let mut triangles = Vec::with_capacity(face_ids.len());
        for face in cdt.inner_faces() {
            let mut ids = face.vertices().map(|v| v.fix().index());
            if orientation(vertices[ids[0]], vertices[ids[1]], vertices[ids[2]]) == Sign::RightTurn {
                ids.swap(1, 2);
            }

            let mut neighbours = [None; 3];
            let mut blocking = [true; 3];
            for edge in face.adjacent_edges() {
                let from = edge.from().fix().index();
                let to = edge.to().fix().index();
                let Some(slot) = (0..3).find(|&i| ids[i] != from && ids[i] != to) else {
                    continue;
                };
                let neighbour = edge
                    .rev()
                    .face()
                    .as_inner()
                    .and_then(|f| face_ids.get(&f.fix()).copied());
                neighbours[slot] = neighbour;
                blocking[slot] = neighbour.is_none() || cdt.is_constraint_edge(edge.as_undirected().fix());
            }
            triangles.push(Triangle { vertices: ids, neighbours, blocking });
        }

        Self { vertices, triangles }
    }

    // --- Queries ---

    /// Number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[must_use]
    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id)
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Position of a vertex.
    ///
    /// Triangles only hold ids taken from the same build, so every id they
    /// carry is in range. Any other id maps to the origin.
    #[must_use]
    pub fn point(&self, id: VertexId) -> Point {
        self.vertices.get(id).copied().unwrap_or(Point::new(0.0, 0.0))
    }

    /// Corner positions of a triangle, counter-clockwise.
    #[must_use]
    pub fn corners(&self, tri: &Triangle) -> [Point; 3] {
        tri.vertices.map(|v| self.point(v))
    }

    /// Endpoints of the edge opposite vertex `i`, as `(ccw(i), cw(i))`.
    #[must_use]
    pub fn edge(&self, tri: &Triangle, i: usize) -> (Point, Point) {
        (self.point(tri.vertices[ccw(i)]), self.point(tri.vertices[cw(i)]))
    }

    /// Whether `p` lies inside or on the boundary of triangle `id`.
    #[must_use]
    pub fn contains(&self, id: TriangleId, p: Point) -> bool {
        let Some(tri) = self.triangle(id) else {
            return false;
        };
        (0..3).all(|i| {
            let (a, b) = self.edge(tri, i);
            orientation(a, b, p) != Sign::RightTurn
        })
    }

    /// All blocking edges, each reported once.
    #[must_use]
    pub fn blocking_edges(&self) -> Vec<Segment> {
        let mut out = Vec::new();
        for (id, tri) in self.triangles.iter().enumerate() {
            for i in 0..3 {
                if !tri.blocking[i] {
                    continue;
                }
                // Report shared edges from the lower-indexed side only.
                if tri.neighbours[i].is_some_and(|n| n < id) {
                    continue;
                }
                let (a, b) = self.edge(tri, i);
                out.push(Segment::new(a, b));
            }
        }
        out
    }
}

fn insert(cdt: &mut Cdt, p: Point) -> Result<FixedVertexHandle, MeshError> {
    cdt.insert(Point2::new(p.x, p.y))
        .map_err(|reason| MeshError::Insertion { x: p.x, y: p.y, reason })
}

/// Split segments at every point where they cross or touch another, so no two
/// resulting pieces cross in their interiors. Each crossing is computed once
/// and shared by both segments; crossings within a hair of an endpoint snap
/// onto it.
fn split_crossings(segments: &[Segment]) -> Vec<Segment> {
    let mut cuts: Vec<Vec<(f64, Point)>> = vec![Vec::new(); segments.len()];
    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            let (s, o) = (segments[i], segments[j]);
            let Some(mut ix) = intersection(s.a, s.b, o.a, o.b) else {
                continue;
            };
            let tolerance = POINT_EPSILON * s.length().max(o.length()).max(1.0);
            if let Some(end) = [s.a, s.b, o.a, o.b].into_iter().find(|e| e.distance(ix) <= tolerance) {
                ix = end;
            }
            for k in [i, j] {
                let seg = segments[k];
                let d = seg.b - seg.a;
                let t = (ix - seg.a).dot(d) / d.dot(d);
                if t > 0.0 && t < 1.0 && ix != seg.a && ix != seg.b {
                    cuts[k].push((t, ix));
                }
            }
        }
    }

    let mut out = Vec::with_capacity(segments.len());
    for (seg, mut seg_cuts) in segments.iter().zip(cuts) {
        seg_cuts.sort_by(|a, b| a.0.total_cmp(&b.0));
        seg_cuts.dedup_by(|a, b| a.1 == b.1);
        let mut start = seg.a;
        for (_, cut) in seg_cuts {
            if cut != start {
                out.push(Segment::new(start, cut));
            }
            start = cut;
        }
        if start != seg.b {
            out.push(Segment::new(start, seg.b));
        }
    }
    out
}
