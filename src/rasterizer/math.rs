//! Vector math and point queries

use serde::{Deserialize, Serialize};

use super::types::{Vertex, MAX_AVARS};
use crate::error::RasterError;

/// 2D point in screen space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Center of the three vertices' screen positions
    pub fn centroid(v0: &Vertex, v1: &Vertex, v2: &Vertex) -> Self {
        Self {
            x: (v0.x + v1.x + v2.x) / 3.0,
            y: (v0.y + v1.y + v2.y) / 3.0,
        }
    }
}

/// Barycentric weights of a point and the attributes they produce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaryCoords {
    pub w0: f32,
    pub w1: f32,
    pub w2: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub z: f32,
    pub avar: [f32; MAX_AVARS],
}

impl BaryCoords {
    /// True if the point lies inside or on the triangle
    pub fn is_inside(&self) -> bool {
        self.w0 >= 0.0 && self.w1 >= 0.0 && self.w2 >= 0.0
    }
}

/// Calculate barycentric coordinates for point p in triangle (v0, v1, v2).
///
/// Unlike the block rasterizer this evaluates everything directly for one
/// point. Collinear vertices have no barycentric frame and are reported as
/// [`RasterError::DegenerateTriangle`], as are slivers whose weights at `p`
/// overflow.
pub fn barycentric(v0: &Vertex, v1: &Vertex, v2: &Vertex, p: Vec2) -> Result<BaryCoords, RasterError> {
    let d = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if d == 0.0 || !d.is_finite() {
        return Err(RasterError::DegenerateTriangle);
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / d;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / d;
    let w2 = 1.0 - w0 - w1;

    // near-zero area can still push the weights out of f32 range
    if !(w0.is_finite() && w1.is_finite() && w2.is_finite()) {
        return Err(RasterError::DegenerateTriangle);
    }

    let mix = |a: f32, b: f32, c: f32| w0 * a + w1 * b + w2 * c;

    let mut avar = [0.0; MAX_AVARS];
    for (i, slot) in avar.iter_mut().enumerate() {
        *slot = mix(v0.avar[i], v1.avar[i], v2.avar[i]);
    }

    Ok(BaryCoords {
        w0,
        w1,
        w2,
        r: mix(v0.r, v1.r, v2.r),
        g: mix(v0.g, v1.g, v2.g),
        b: mix(v0.b, v1.b, v2.b),
        z: mix(v0.z, v1.z, v2.z),
        avar,
    })
}
