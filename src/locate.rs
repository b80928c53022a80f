//! Point location by walking the mesh from a hint triangle.

#[cfg(test)]
#[path = "locate_test.rs"]
mod locate_test;

use std::collections::HashSet;

use tracing::trace;

use crate::geom::{Point, Sign, orientation};
use crate::mesh::{Mesh, TriangleId};

impl Mesh {
    /// Find the triangle containing `point`, starting the walk at `hint`
    /// (or the first triangle). `None` means the point is outside the mesh.
    ///
    /// At each step the walk crosses the first edge the point lies strictly
    /// outside of, skipping neighbours it has already visited. A point on an
    /// edge counts as inside, so the first triangle reached that touches it
    /// wins. If every outward neighbour has been visited the walk falls back
    /// to a linear scan, which keeps the search bounded by the mesh size.
    #[must_use]
    pub fn locate(&self, point: Point, hint: Option<TriangleId>) -> Option<TriangleId> {
        if self.is_empty() || !point.is_finite() {
            return None;
        }
        let mut current = hint.filter(|&t| t < self.len()).unwrap_or(0);
        let mut visited: HashSet<TriangleId> = HashSet::new();

        loop {
            visited.insert(current);
            let tri = self.triangle(current)?;

            let mut next = None;
            let mut stalled = false;
            for i in 0..3 {
                let (a, b) = self.edge(tri, i);
                if orientation(a, b, point) != Sign::RightTurn {
                    continue;
                }
                match tri.neighbours[i] {
                    None => return None,
                    Some(n) if !visited.contains(&n) => {
                        next = Some(n);
                        break;
                    }
                    Some(_) => stalled = true,
                }
            }

            match next {
                Some(n) => current = n,
                None if stalled => {
                    trace!(steps = visited.len(), "locate: walk stalled, scanning");
                    return (0..self.len()).find(|&t| self.contains(t, point));
                }
                None => return Some(current),
            }
        }
    }
}
