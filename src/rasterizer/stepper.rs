//! Incremental evaluation state
//!
//! `PixelData` and `EdgeData` hold the current value of every equation at
//! one sample position and move it around the grid by adding coefficients.

use super::equations::TriangleEquation;
use super::types::MAX_AVARS;

/// Interpolated attributes at the current sample position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelData {
    /// Sample position (pixel center)
    pub x: f32,
    pub y: f32,

    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub z: f32,
    pub w: f32,

    pub avar: [f32; MAX_AVARS],
}

impl PixelData {
    /// Evaluate every interpolant directly at (x, y)
    pub fn init(eqn: &TriangleEquation, x: f32, y: f32) -> Self {
        let mut avar = [0.0; MAX_AVARS];
        for i in 0..eqn.avar_count {
            avar[i] = eqn.avar[i].evaluate(x, y);
        }

        Self {
            x,
            y,
            r: eqn.r.evaluate(x, y),
            g: eqn.g.evaluate(x, y),
            b: eqn.b.evaluate(x, y),
            z: eqn.z.evaluate(x, y),
            w: eqn.w.evaluate(x, y),
            avar,
        }
    }

    /// Move one pixel to the right
    #[inline]
    pub fn step_x(&mut self, eqn: &TriangleEquation) {
        self.x += 1.0;
        self.r = eqn.r.step_x(self.r);
        self.g = eqn.g.step_x(self.g);
        self.b = eqn.b.step_x(self.b);
        self.z = eqn.z.step_x(self.z);
        self.w = eqn.w.step_x(self.w);
        for i in 0..eqn.avar_count {
            self.avar[i] = eqn.avar[i].step_x(self.avar[i]);
        }
    }

    /// Move one pixel down
    #[inline]
    pub fn step_y(&mut self, eqn: &TriangleEquation) {
        self.y += 1.0;
        self.r = eqn.r.step_y(self.r);
        self.g = eqn.g.step_y(self.g);
        self.b = eqn.b.step_y(self.b);
        self.z = eqn.z.step_y(self.z);
        self.w = eqn.w.step_y(self.w);
        for i in 0..eqn.avar_count {
            self.avar[i] = eqn.avar[i].step_y(self.avar[i]);
        }
    }
}

/// Edge function values at the current sample position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeData {
    pub ev0: f32,
    pub ev1: f32,
    pub ev2: f32,
}

impl EdgeData {
    pub fn init(eqn: &TriangleEquation, x: f32, y: f32) -> Self {
        Self {
            ev0: eqn.e0.evaluate(x, y),
            ev1: eqn.e1.evaluate(x, y),
            ev2: eqn.e2.evaluate(x, y),
        }
    }

    #[inline]
    pub fn step_x(&mut self, eqn: &TriangleEquation) {
        self.ev0 = eqn.e0.step_x(self.ev0);
        self.ev1 = eqn.e1.step_x(self.ev1);
        self.ev2 = eqn.e2.step_x(self.ev2);
    }

    #[inline]
    pub fn step_x_by(&mut self, eqn: &TriangleEquation, size: f32) {
        self.ev0 = eqn.e0.step_x_by(self.ev0, size);
        self.ev1 = eqn.e1.step_x_by(self.ev1, size);
        self.ev2 = eqn.e2.step_x_by(self.ev2, size);
    }

    #[inline]
    pub fn step_y(&mut self, eqn: &TriangleEquation) {
        self.ev0 = eqn.e0.step_y(self.ev0);
        self.ev1 = eqn.e1.step_y(self.ev1);
        self.ev2 = eqn.e2.step_y(self.ev2);
    }

    #[inline]
    pub fn step_y_by(&mut self, eqn: &TriangleEquation, size: f32) {
        self.ev0 = eqn.e0.step_y_by(self.ev0, size);
        self.ev1 = eqn.e1.step_y_by(self.ev1, size);
        self.ev2 = eqn.e2.step_y_by(self.ev2, size);
    }

    /// True if the sample is inside all three edges
    #[inline]
    pub fn test(&self, eqn: &TriangleEquation) -> bool {
        eqn.e0.test(self.ev0) && eqn.e1.test(self.ev1) && eqn.e2.test(self.ev2)
    }

    /// Bit i set if edge i passes at this sample
    #[inline]
    pub fn mask(&self, eqn: &TriangleEquation) -> u8 {
        (eqn.e0.test(self.ev0) as u8) | ((eqn.e1.test(self.ev1) as u8) << 1) | ((eqn.e2.test(self.ev2) as u8) << 2)
    }
}
