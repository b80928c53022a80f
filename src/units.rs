//! World/screen coordinate mapping, unit scale and grid snapping.
//!
//! The geometry core works purely in world space. Screen ("local")
//! coordinates only appear at the edges: culling lights against the viewport
//! and handing polygons to a renderer. The camera is always passed in
//! explicitly.

#[cfg(test)]
#[path = "units_test.rs"]
mod units_test;

use serde::{Deserialize, Serialize};

use crate::geom::Point;

/// Camera state for pan/zoom.
///
/// `pan_x` / `pan_y` are in world units and applied before zooming.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// World point to screen point.
    #[must_use]
    pub fn g2l(&self, world: Point) -> Point {
        Point::new(self.g2lx(world.x), self.g2ly(world.y))
    }

    #[must_use]
    pub fn g2lx(&self, x: f64) -> f64 {
        (x + self.pan_x) * self.zoom
    }

    #[must_use]
    pub fn g2ly(&self, y: f64) -> f64 {
        (y + self.pan_y) * self.zoom
    }

    /// World distance to screen distance.
    #[must_use]
    pub fn g2lz(&self, z: f64) -> f64 {
        z * self.zoom
    }

    /// Game-unit radius to screen distance.
    #[must_use]
    pub fn g2lr(&self, r: f64, scale: &UnitScale) -> f64 {
        self.g2lz(scale.unit_distance(r))
    }

    /// Screen point to world point.
    #[must_use]
    pub fn l2g(&self, local: Point) -> Point {
        Point::new(self.l2gx(local.x), self.l2gy(local.y))
    }

    #[must_use]
    pub fn l2gx(&self, x: f64) -> f64 {
        x / self.zoom - self.pan_x
    }

    #[must_use]
    pub fn l2gy(&self, y: f64) -> f64 {
        y / self.zoom - self.pan_y
    }

    /// Screen distance to world distance.
    #[must_use]
    pub fn l2gz(&self, z: f64) -> f64 {
        z / self.zoom
    }

    /// Whether a world-space circle overlaps the `width × height` viewport.
    #[must_use]
    pub fn circle_visible(&self, center: Point, radius: f64, width: f64, height: f64) -> bool {
        let c = self.g2l(center);
        let r = self.g2lz(radius);
        let nearest_x = c.x.clamp(0.0, width.max(0.0));
        let nearest_y = c.y.clamp(0.0, height.max(0.0));
        let (dx, dy) = (c.x - nearest_x, c.y - nearest_y);
        dx * dx + dy * dy <= r * r
    }
}

/// Conversion between game units (e.g. feet) and world distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitScale {
    /// Game units covered by one grid cell.
    pub unit_size: f64,
    /// World size of one grid cell.
    pub grid_size: f64,
}

impl UnitScale {
    /// World distance covered by `r` game units.
    #[must_use]
    pub fn unit_distance(&self, r: f64) -> f64 {
        r / self.unit_size * self.grid_size
    }

    /// Nearest grid line to `v`.
    #[must_use]
    pub fn clamp_grid_line(&self, v: f64) -> f64 {
        (v / self.grid_size).round() * self.grid_size
    }

    /// Snap a world point to the nearest grid intersection.
    #[must_use]
    pub fn clamp_to_grid(&self, p: Point) -> Point {
        Point::new(self.clamp_grid_line(p.x), self.clamp_grid_line(p.y))
    }
}

#[must_use]
pub fn to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

#[must_use]
pub fn to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}
