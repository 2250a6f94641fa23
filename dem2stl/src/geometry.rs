//! Vertices, triangles and facet normals.

use std::ops::Sub;

/// A point or direction in model space, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vertex3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Cross product `self × other` (right-hand rule).
    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length.
    pub fn magnitude(self) -> f32 {
        self.dot(self).sqrt()
    }
}

impl Sub for Vertex3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

/// A mesh facet: three counter-clockwise vertices and their unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub normal: Vertex3,
    pub vertices: [Vertex3; 3],
}

impl Triangle {
    /// Build a facet and compute its normal from the winding order.
    pub fn new(v1: Vertex3, v2: Vertex3, v3: Vertex3) -> Self {
        Self {
            normal: facet_normal(v1, v2, v3),
            vertices: [v1, v2, v3],
        }
    }
}

/// Unit normal of the triangle `v1, v2, v3`.
///
/// Computed as `(v2 - v1) × (v3 - v1)` scaled to length one, so it points
/// towards the side from which the vertices appear counter-clockwise.
/// Collinear vertices have a zero cross product and produce NaN components.
pub fn facet_normal(v1: Vertex3, v2: Vertex3, v3: Vertex3) -> Vertex3 {
    let n = (v2 - v1).cross(v3 - v1);
    let magnitude = n.magnitude();
    Vertex3 {
        x: n.x / magnitude,
        y: n.y / magnitude,
        z: n.z / magnitude,
    }
}
