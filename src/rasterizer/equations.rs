//! Edge, parameter and triangle equations
//!
//! Every quantity the rasterizer needs is an affine function of the sample
//! position, `a*x + b*y + c`. Evaluating once and then adding `a` or `b`
//! walks the function across the pixel grid without any per-pixel divide.

use super::types::{Vertex, MAX_AVARS};

/// Implicit line equation of one triangle edge
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeEquation {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    /// Owner of points exactly on the edge
    pub tie: bool,
}

impl EdgeEquation {
    /// Edge from v0 to v1. The line passes through the edge midpoint.
    pub fn new(v0: &Vertex, v1: &Vertex) -> Self {
        let a = v0.y - v1.y;
        let b = v1.x - v0.x;
        let c = -(a * (v0.x + v1.x) + b * (v0.y + v1.y)) / 2.0;
        let tie = if a != 0.0 { a > 0.0 } else { b > 0.0 };
        Self { a, b, c, tie }
    }

    #[inline]
    pub fn evaluate(&self, x: f32, y: f32) -> f32 {
        self.a * x + self.b * y + self.c
    }

    /// Test an evaluated value. Zero is inside only for the tie owner, so two
    /// triangles sharing this edge in opposite directions never both claim it.
    #[inline]
    pub fn test(&self, v: f32) -> bool {
        v > 0.0 || (v == 0.0 && self.tie)
    }

    #[inline]
    pub fn test_point(&self, x: f32, y: f32) -> bool {
        self.test(self.evaluate(x, y))
    }

    #[inline]
    pub fn step_x(&self, v: f32) -> f32 {
        v + self.a
    }

    #[inline]
    pub fn step_x_by(&self, v: f32, size: f32) -> f32 {
        v + self.a * size
    }

    #[inline]
    pub fn step_y(&self, v: f32) -> f32 {
        v + self.b
    }

    #[inline]
    pub fn step_y_by(&self, v: f32, size: f32) -> f32 {
        v + self.b * size
    }
}

/// Linear interpolant of one scalar vertex attribute
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParameterEquation {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl ParameterEquation {
    /// Build the interpolant for samples p0, p1, p2 taken at v0, v1, v2.
    ///
    /// Each edge evaluates to twice the area of the sub-triangle it forms with
    /// a point, so weighting the edge opposite each vertex by that vertex's
    /// sample and dividing by twice the full area yields the barycentric blend.
    pub fn new(
        p0: f32,
        p1: f32,
        p2: f32,
        e0: &EdgeEquation,
        e1: &EdgeEquation,
        e2: &EdgeEquation,
        area: f32,
    ) -> Self {
        let factor = 1.0 / (2.0 * area);

        // e1 is opposite v0, e2 opposite v1, e0 opposite v2
        Self {
            a: factor * (p0 * e1.a + p1 * e2.a + p2 * e0.a),
            b: factor * (p0 * e1.b + p1 * e2.b + p2 * e0.b),
            c: factor * (p0 * e1.c + p1 * e2.c + p2 * e0.c),
        }
    }

    #[inline]
    pub fn evaluate(&self, x: f32, y: f32) -> f32 {
        self.a * x + self.b * y + self.c
    }

    #[inline]
    pub fn step_x(&self, v: f32) -> f32 {
        v + self.a
    }

    #[inline]
    pub fn step_x_by(&self, v: f32, size: f32) -> f32 {
        v + self.a * size
    }

    #[inline]
    pub fn step_y(&self, v: f32) -> f32 {
        v + self.b
    }

    #[inline]
    pub fn step_y_by(&self, v: f32, size: f32) -> f32 {
        v + self.b * size
    }
}

/// All equations needed to rasterize one triangle.
///
/// Built fresh for every draw call and never cached.
#[derive(Debug, Clone)]
pub struct TriangleEquation {
    /// Signed area; `<= 0` means degenerate or back-facing
    pub area: f32,

    pub e0: EdgeEquation,
    pub e1: EdgeEquation,
    pub e2: EdgeEquation,

    pub r: ParameterEquation,
    pub g: ParameterEquation,
    pub b: ParameterEquation,
    pub z: ParameterEquation,
    pub w: ParameterEquation,

    pub avar: [ParameterEquation; MAX_AVARS],
    /// Number of leading `avar` slots that are interpolated
    pub avar_count: usize,
}

impl TriangleEquation {
    /// Set up edges v0->v1, v1->v2, v2->v0 and, for front-facing triangles,
    /// the color, depth and first `avar_count` affine variable interpolants.
    pub fn new(v0: &Vertex, v1: &Vertex, v2: &Vertex, avar_count: usize) -> Self {
        let e0 = EdgeEquation::new(v0, v1);
        let e1 = EdgeEquation::new(v1, v2);
        let e2 = EdgeEquation::new(v2, v0);

        let finite = v0.is_finite() && v1.is_finite() && v2.is_finite();
        let area = if finite { 0.5 * (e0.c + e1.c + e2.c) } else { 0.0 };

        let mut eqn = Self {
            area,
            e0,
            e1,
            e2,
            r: ParameterEquation::default(),
            g: ParameterEquation::default(),
            b: ParameterEquation::default(),
            z: ParameterEquation::default(),
            w: ParameterEquation::default(),
            avar: [ParameterEquation::default(); MAX_AVARS],
            avar_count: avar_count.min(MAX_AVARS),
        };

        // Back-facing: nothing will be drawn, skip the interpolants
        if eqn.is_backfacing() {
            return eqn;
        }

        let param = |p0: f32, p1: f32, p2: f32| ParameterEquation::new(p0, p1, p2, &e0, &e1, &e2, area);

        eqn.r = param(v0.r, v1.r, v2.r);
        eqn.g = param(v0.g, v1.g, v2.g);
        eqn.b = param(v0.b, v1.b, v2.b);
        eqn.z = param(v0.z, v1.z, v2.z);
        eqn.w = param(v0.w, v1.w, v2.w);

        for i in 0..eqn.avar_count {
            eqn.avar[i] = param(v0.avar[i], v1.avar[i], v2.avar[i]);
        }

        eqn
    }

    /// True for degenerate or back-facing triangles (also NaN areas)
    #[inline]
    pub fn is_backfacing(&self) -> bool {
        !(self.area > 0.0)
    }

    /// Test a point against all three edges
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.e0.test_point(x, y) && self.e1.test_point(x, y) && self.e2.test_point(x, y)
    }
}
