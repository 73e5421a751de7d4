//! Pixel shaders
//!
//! A shader receives the interpolated attributes of one covered pixel and
//! writes the result into the destination. All state a shader needs lives
//! in the shader value itself and is shared read-only across worker threads.

use super::stepper::PixelData;
use super::surface::Surface;

pub trait PixelShader: Sync {
    /// Number of affine variables interpolated for this shader
    const AVAR_COUNT: usize = 0;

    fn draw_pixel(&self, target: &mut Surface<'_>, p: &PixelData);
}

/// Convert an interpolated channel in [0, 1] to a byte by truncating `v * 255`.
/// Out-of-range values saturate, NaN becomes 0.
#[inline]
pub fn to_byte(v: f32) -> u8 {
    (v * 255.0) as u8
}

/// Writes the interpolated vertex color
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorShader;

impl PixelShader for ColorShader {
    #[inline]
    fn draw_pixel(&self, target: &mut Surface<'_>, p: &PixelData) {
        let color = target.format().map_rgb(to_byte(p.r), to_byte(p.g), to_byte(p.b));
        target.put_pixel(p.x as usize, p.y as usize, color);
    }
}

/// Writes a constant color, ignoring interpolants (flat fill)
#[derive(Debug, Clone, Copy)]
pub struct FlatShader {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PixelShader for FlatShader {
    #[inline]
    fn draw_pixel(&self, target: &mut Surface<'_>, p: &PixelData) {
        let color = target.format().map_rgb(self.r, self.g, self.b);
        target.put_pixel(p.x as usize, p.y as usize, color);
    }
}
