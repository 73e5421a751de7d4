//! Core types for the rasterizer

use serde::{Deserialize, Serialize};

/// Maximum number of affine-interpolated variables per vertex
pub const MAX_AVARS: usize = 16;

/// Maximum number of perspective-interpolated variables per vertex
pub const MAX_PVARS: usize = 16;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// A screen-space vertex with interpolated attributes.
///
/// Color channels are expected in [0, 1]. The attribute arrays have a fixed
/// capacity; only as many affine variables as the active pixel shader asks
/// for are interpolated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,

    pub r: f32,
    pub g: f32,
    pub b: f32,

    /// Affine variables
    pub avar: [f32; MAX_AVARS],
    /// Perspective variables (carried, never interpolated)
    pub pvar: [f32; MAX_PVARS],
}

impl Vertex {
    /// Vertex at (x, y) with w = 1 and black color
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            w: 1.0,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.r = r;
        self.g = g;
        self.b = b;
        self
    }

    pub fn with_depth(mut self, z: f32, w: f32) -> Self {
        self.z = z;
        self.w = w;
        self
    }

    /// Set the leading affine variables. Values past MAX_AVARS are dropped.
    pub fn with_avars(mut self, values: &[f32]) -> Self {
        for (slot, v) in self.avar.iter_mut().zip(values) {
            *slot = *v;
        }
        self
    }

    /// Set the leading perspective variables. Values past MAX_PVARS are dropped.
    pub fn with_pvars(mut self, values: &[f32]) -> Self {
        for (slot, v) in self.pvar.iter_mut().zip(values) {
            *slot = *v;
        }
        self
    }

    /// True if the screen position is usable for rasterization
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
