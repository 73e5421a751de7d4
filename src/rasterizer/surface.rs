//! Destination surfaces and pixel formats
//!
//! A [`Surface`] borrows a raw pixel buffer described by width, height,
//! pitch (bytes per row) and a [`PixelFormat`]. The rasterizer only ever
//! writes through [`Surface::put_pixel`], and splits a surface into
//! disjoint row bands when drawing in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::types::Color;
use crate::error::RasterError;

/// Byte order used when storing a packed pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    #[cfg(target_endian = "big")]
    pub const NATIVE: ByteOrder = ByteOrder::Big;
    #[cfg(not(target_endian = "big"))]
    pub const NATIVE: ByteOrder = ByteOrder::Little;
}

/// Bit layout of the channels inside a packed pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelLayout {
    /// 1 byte: rrrgggbb
    Rgb332,
    /// 2 bytes: rrrrrggggggbbbbb
    Rgb565,
    /// 3 bytes: 0xRRGGBB
    Rgb888,
    /// 4 bytes: 0x00RRGGBB
    Xrgb8888,
    /// 4 bytes: 0xRRGGBBAA, alpha always opaque
    Rgba8888,
}

/// How (r, g, b) bytes become a stored pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelFormat {
    pub layout: ChannelLayout,
    pub byte_order: ByteOrder,
}

impl PixelFormat {
    /// 32-bit 0x00RRGGBB in native order (the common window surface format)
    pub const XRGB8888: PixelFormat = PixelFormat {
        layout: ChannelLayout::Xrgb8888,
        byte_order: ByteOrder::NATIVE,
    };

    /// Bytes r, g, b, a in memory (texture upload / PNG order)
    pub const RGBA8888: PixelFormat = PixelFormat {
        layout: ChannelLayout::Rgba8888,
        byte_order: ByteOrder::Big,
    };

    pub fn new(layout: ChannelLayout, byte_order: ByteOrder) -> Self {
        Self { layout, byte_order }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        match self.layout {
            ChannelLayout::Rgb332 => 1,
            ChannelLayout::Rgb565 => 2,
            ChannelLayout::Rgb888 => 3,
            ChannelLayout::Xrgb8888 | ChannelLayout::Rgba8888 => 4,
        }
    }

    /// Pack 8-bit channels into this format's pixel value
    #[inline]
    pub fn map_rgb(&self, r: u8, g: u8, b: u8) -> u32 {
        let (r, g, b) = (r as u32, g as u32, b as u32);
        match self.layout {
            ChannelLayout::Rgb332 => (r & 0xE0) | ((g & 0xE0) >> 3) | (b >> 6),
            ChannelLayout::Rgb565 => ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3),
            ChannelLayout::Rgb888 | ChannelLayout::Xrgb8888 => (r << 16) | (g << 8) | b,
            ChannelLayout::Rgba8888 => (r << 24) | (g << 16) | (b << 8) | 0xFF,
        }
    }

    /// Expand a pixel value back to 8-bit channels
    pub fn unmap_rgb(&self, pixel: u32) -> (u8, u8, u8) {
        // scale an n-bit channel to the full 0..=255 range
        let expand = |v: u32, max: u32| (v * 255 / max) as u8;
        match self.layout {
            ChannelLayout::Rgb332 => (
                expand((pixel >> 5) & 0x7, 7),
                expand((pixel >> 2) & 0x7, 7),
                expand(pixel & 0x3, 3),
            ),
            ChannelLayout::Rgb565 => (
                expand((pixel >> 11) & 0x1F, 31),
                expand((pixel >> 5) & 0x3F, 63),
                expand(pixel & 0x1F, 31),
            ),
            ChannelLayout::Rgb888 | ChannelLayout::Xrgb8888 => {
                ((pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8)
            }
            ChannelLayout::Rgba8888 => ((pixel >> 24) as u8, (pixel >> 16) as u8, (pixel >> 8) as u8),
        }
    }

    /// Store `pixel` into the first `bytes_per_pixel` bytes of `dst`
    #[inline]
    pub fn write(&self, dst: &mut [u8], pixel: u32) {
        match self.layout {
            ChannelLayout::Rgb332 => dst[0] = pixel as u8,
            ChannelLayout::Rgb565 => {
                let bytes = match self.byte_order {
                    ByteOrder::Little => (pixel as u16).to_le_bytes(),
                    ByteOrder::Big => (pixel as u16).to_be_bytes(),
                };
                dst[..2].copy_from_slice(&bytes);
            }
            ChannelLayout::Rgb888 => {
                let [_, hi, mid, lo] = pixel.to_be_bytes();
                let bytes = match self.byte_order {
                    ByteOrder::Little => [lo, mid, hi],
                    ByteOrder::Big => [hi, mid, lo],
                };
                dst[..3].copy_from_slice(&bytes);
            }
            ChannelLayout::Xrgb8888 | ChannelLayout::Rgba8888 => {
                let bytes = match self.byte_order {
                    ByteOrder::Little => pixel.to_le_bytes(),
                    ByteOrder::Big => pixel.to_be_bytes(),
                };
                dst[..4].copy_from_slice(&bytes);
            }
        }
    }

    /// Load a pixel value stored by [`PixelFormat::write`]
    pub fn read(&self, src: &[u8]) -> u32 {
        match self.layout {
            ChannelLayout::Rgb332 => src[0] as u32,
            ChannelLayout::Rgb565 => {
                let bytes = [src[0], src[1]];
                (match self.byte_order {
                    ByteOrder::Little => u16::from_le_bytes(bytes),
                    ByteOrder::Big => u16::from_be_bytes(bytes),
                }) as u32
            }
            ChannelLayout::Rgb888 => {
                let (hi, mid, lo) = match self.byte_order {
                    ByteOrder::Little => (src[2], src[1], src[0]),
                    ByteOrder::Big => (src[0], src[1], src[2]),
                };
                u32::from_be_bytes([0, hi, mid, lo])
            }
            ChannelLayout::Xrgb8888 | ChannelLayout::Rgba8888 => {
                let bytes = [src[0], src[1], src[2], src[3]];
                match self.byte_order {
                    ByteOrder::Little => u32::from_le_bytes(bytes),
                    ByteOrder::Big => u32::from_be_bytes(bytes),
                }
            }
        }
    }
}

/// Borrowed destination pixel buffer.
///
/// Rows are `pitch` bytes apart; `origin_y` is the absolute row of the first
/// row in `pixels` (non-zero only for bands split off a larger surface).
#[derive(Debug)]
pub struct Surface<'a> {
    pixels: &'a mut [u8],
    width: usize,
    height: usize,
    pitch: usize,
    format: PixelFormat,
    origin_y: usize,
}

impl<'a> Surface<'a> {
    /// Wrap a pixel buffer, checking that it can hold `height` rows of `pitch` bytes
    pub fn new(
        pixels: &'a mut [u8],
        width: usize,
        height: usize,
        pitch: usize,
        format: PixelFormat,
    ) -> Result<Self, RasterError> {
        let row_bytes = width
            .checked_mul(format.bytes_per_pixel())
            .ok_or_else(|| RasterError::InvalidSurface(format!("width {} overflows", width)))?;
        if pitch < row_bytes {
            return Err(RasterError::InvalidSurface(format!(
                "pitch {} is smaller than a row of {} bytes",
                pitch, row_bytes
            )));
        }
        let needed = pitch
            .checked_mul(height)
            .ok_or_else(|| RasterError::InvalidSurface(format!("height {} overflows", height)))?;
        if pixels.len() < needed {
            return Err(RasterError::InvalidSurface(format!(
                "buffer holds {} bytes, {}x{} needs {}",
                pixels.len(),
                width,
                height,
                needed
            )));
        }

        Ok(Self {
            pixels,
            width,
            height,
            pitch,
            format,
            origin_y: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows held by this surface
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per row, padding included
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Absolute row of the first row held by this surface
    pub fn origin_y(&self) -> usize {
        self.origin_y
    }

    /// Write a packed pixel at absolute coordinates; out-of-range writes are dropped
    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, pixel: u32) {
        if x >= self.width || y < self.origin_y || y - self.origin_y >= self.height {
            return;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = self.pitch * (y - self.origin_y) + bpp * x;
        self.format.write(&mut self.pixels[offset..offset + bpp], pixel);
    }

    /// Read a packed pixel at absolute coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y < self.origin_y || y - self.origin_y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = self.pitch * (y - self.origin_y) + bpp * x;
        Some(self.format.read(&self.pixels[offset..offset + bpp]))
    }

    /// Split into bands of `rows` rows, top to bottom (the last may be shorter)
    pub fn bands(&mut self, rows: usize) -> impl Iterator<Item = Surface<'_>> + '_ {
        let (width, pitch, format, origin_y) = (self.width, self.pitch, self.format, self.origin_y);
        let rows = rows.max(1);
        self.pixels[..self.pitch * self.height]
            .chunks_mut((pitch * rows).max(1))
            .enumerate()
            .map(move |(i, chunk)| Surface {
                height: chunk.len() / pitch,
                pixels: chunk,
                width,
                pitch,
                format,
                origin_y: origin_y + i * rows,
            })
    }

    /// Parallel version of [`Surface::bands`]. Bands never share bytes.
    pub fn par_bands(&mut self, rows: usize) -> impl IndexedParallelIterator<Item = Surface<'_>> + '_ {
        let (width, pitch, format, origin_y) = (self.width, self.pitch, self.format, self.origin_y);
        let rows = rows.max(1);
        self.pixels[..self.pitch * self.height]
            .par_chunks_mut((pitch * rows).max(1))
            .enumerate()
            .map(move |(i, chunk)| Surface {
                height: chunk.len() / pitch,
                pixels: chunk,
                width,
                pitch,
                format,
                origin_y: origin_y + i * rows,
            })
    }
}

/// Owned pixel storage that hands out [`Surface`]s
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
    pitch: usize,
    format: PixelFormat,
}

impl Framebuffer {
    /// Tightly packed framebuffer (pitch = width * bytes per pixel)
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        let pitch = width * format.bytes_per_pixel();
        Self {
            pixels: vec![0; pitch * height],
            width,
            height,
            pitch,
            format,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Fill every pixel with one color
    pub fn clear(&mut self, color: Color) {
        let pixel = self.format.map_rgb(color.r, color.g, color.b);
        let bpp = self.format.bytes_per_pixel();
        for chunk in self.pixels.chunks_exact_mut(bpp) {
            self.format.write(chunk, pixel);
        }
    }

    /// Borrow as a drawing destination
    pub fn surface(&mut self) -> Surface<'_> {
        Surface {
            pixels: &mut self.pixels,
            width: self.width,
            height: self.height,
            pitch: self.pitch,
            format: self.format,
            origin_y: 0,
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = self.pitch * y + bpp * x;
        Some(self.format.read(&self.pixels[offset..offset + bpp]))
    }

    /// 8-bit channels of the pixel at (x, y)
    pub fn get_rgb(&self, x: usize, y: usize) -> Option<(u8, u8, u8)> {
        self.get_pixel(x, y).map(|p| self.format.unmap_rgb(p))
    }
}
