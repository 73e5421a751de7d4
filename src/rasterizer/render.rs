//! Triangle rasterization
//!
//! The driver builds the triangle equations, classifies the bounding box
//! block by block, then walks each block row as a separate band of the
//! destination. Full blocks are filled without edge tests; partial blocks
//! test every pixel.

use std::time::Instant;

use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::blocks::{BlockGrid, BoundingBox, Coverage};
use super::equations::TriangleEquation;
use super::shader::{ColorShader, PixelShader};
use super::stepper::{EdgeData, PixelData};
use super::surface::Surface;
use super::types::Vertex;
use super::BLOCK_SIZE;

/// Runtime rasterizer options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterOptions {
    /// Spread block rows across the rayon thread pool
    pub parallel: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// What one draw call did (advisory)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub blocks_outside: usize,
    pub blocks_full: usize,
    pub blocks_partial: usize,
    pub pixels_shaded: usize,
}

/// Block-classified triangle rasterizer with `B` x `B` pixel blocks
pub struct Rasterizer<S = ColorShader, const B: usize = BLOCK_SIZE> {
    shader: S,
    options: RasterOptions,
}

impl<S: PixelShader, const B: usize> Rasterizer<S, B> {
    const BLOCK_SIZE_CHECK: () = assert!(B > 0 && B.is_power_of_two(), "block size must be a power of two");

    pub fn new(shader: S) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::BLOCK_SIZE_CHECK;
        Self {
            shader,
            options: RasterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RasterOptions) -> Self {
        self.options = options;
        self
    }

    /// Draw one triangle. Returns once every block has been processed.
    ///
    /// Triangles with area <= 0 (degenerate or back-facing) draw nothing.
    pub fn draw_triangle(&self, v0: &Vertex, v1: &Vertex, v2: &Vertex, surface: &mut Surface<'_>) -> DrawStats {
        let start = Instant::now();

        let eqn = TriangleEquation::new(v0, v1, v2, S::AVAR_COUNT);
        if eqn.is_backfacing() {
            trace!("culled triangle with area {}", eqn.area);
            return DrawStats::default();
        }

        let Some(bbox) = BoundingBox::of_triangle(v0, v1, v2, surface.width(), surface.height()) else {
            trace!("triangle is off screen");
            return DrawStats::default();
        };

        let grid = BlockGrid::classify(&eqn, &bbox.aligned(B), B);
        let (blocks_outside, blocks_full, blocks_partial) = grid.counts();

        // grid.origin_y is a multiple of B, so block rows line up with bands
        let first_band = grid.origin_y / B;
        let shade_band = |(band_index, mut band): (usize, Surface<'_>)| {
            self.rasterize_band(&eqn, &grid, band_index - first_band, &mut band)
        };

        let pixels_shaded: usize = if self.options.parallel {
            surface
                .par_bands(B)
                .enumerate()
                .skip(first_band)
                .take(grid.rows)
                .map(shade_band)
                .sum()
        } else {
            surface
                .bands(B)
                .enumerate()
                .skip(first_band)
                .take(grid.rows)
                .map(shade_band)
                .sum()
        };

        let stats = DrawStats {
            blocks_outside,
            blocks_full,
            blocks_partial,
            pixels_shaded,
        };
        debug!(
            "draw_triangle: {} full, {} partial, {} outside blocks, {} pixels in {}us",
            stats.blocks_full,
            stats.blocks_partial,
            stats.blocks_outside,
            stats.pixels_shaded,
            start.elapsed().as_micros()
        );
        stats
    }

    /// Rasterize one block row into its band
    fn rasterize_band(&self, eqn: &TriangleEquation, grid: &BlockGrid, row: usize, band: &mut Surface<'_>) -> usize {
        let y = grid.origin_y + row * B;
        grid.row(row)
            .iter()
            .enumerate()
            .map(|(col, coverage)| {
                let x = grid.origin_x + col * B;
                match coverage {
                    Coverage::Outside => 0,
                    Coverage::Full => self.rasterize_block::<false>(eqn, x, y, band),
                    Coverage::Partial => self.rasterize_block::<true>(eqn, x, y, band),
                }
            })
            .sum()
    }

    /// Walk one block from its top-left pixel (x, y), clipped to the band
    fn rasterize_block<const TEST_EDGES: bool>(
        &self,
        eqn: &TriangleEquation,
        x: usize,
        y: usize,
        target: &mut Surface<'_>,
    ) -> usize {
        let x_end = (x + B).min(target.width());
        let y_end = (y + B).min(target.origin_y() + target.height());
        if x >= x_end || y >= y_end {
            return 0;
        }

        let (sx, sy) = (x as f32 + 0.5, y as f32 + 0.5);
        let mut row_pixel = PixelData::init(eqn, sx, sy);
        let mut row_edges = if TEST_EDGES { EdgeData::init(eqn, sx, sy) } else { EdgeData::default() };

        let mut shaded = 0;
        for _ in y..y_end {
            let mut p = row_pixel;
            let mut e = row_edges;

            for _ in x..x_end {
                if !TEST_EDGES || e.test(eqn) {
                    self.shader.draw_pixel(target, &p);
                    shaded += 1;
                }

                p.step_x(eqn);
                if TEST_EDGES {
                    e.step_x(eqn);
                }
            }

            row_pixel.step_y(eqn);
            if TEST_EDGES {
                row_edges.step_y(eqn);
            }
        }
        shaded
    }
}

impl Default for Rasterizer<ColorShader, BLOCK_SIZE> {
    fn default() -> Self {
        Self::new(ColorShader)
    }
}

/// Draw a Gouraud-shaded triangle with the default block size, in parallel
pub fn draw_triangle(v0: &Vertex, v1: &Vertex, v2: &Vertex, surface: &mut Surface<'_>) -> DrawStats {
    Rasterizer::<ColorShader, BLOCK_SIZE>::default().draw_triangle(v0, v1, v2, surface)
}

/// Brute-force reference: test every pixel of the bounding box directly.
///
/// Shades exactly the pixels the block rasterizer should; used to verify it.
pub fn rasterize_reference<S: PixelShader>(
    shader: &S,
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    surface: &mut Surface<'_>,
) -> usize {
    let eqn = TriangleEquation::new(v0, v1, v2, S::AVAR_COUNT);
    if eqn.is_backfacing() {
        return 0;
    }
    let Some(bbox) = BoundingBox::of_triangle(v0, v1, v2, surface.width(), surface.height()) else {
        return 0;
    };

    let mut shaded = 0;
    for y in bbox.min_y..=bbox.max_y {
        for x in bbox.min_x..=bbox.max_x {
            let (sx, sy) = (x as f32 + 0.5, y as f32 + 0.5);
            if eqn.contains(sx, sy) {
                shader.draw_pixel(surface, &PixelData::init(&eqn, sx, sy));
                shaded += 1;
            }
        }
    }
    shaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::shader::{to_byte, FlatShader};
    use crate::rasterizer::surface::{ByteOrder, ChannelLayout, Framebuffer, PixelFormat};
    use crate::rasterizer::types::Color;
    use test_log::test;

    fn scenario() -> (Vertex, Vertex, Vertex) {
        (
            Vertex::new(500.0, 50.0).with_color(0.83, 0.12, 0.45),
            Vertex::new(250.0, 300.0).with_color(0.05, 0.97, 0.31),
            Vertex::new(10.0, 10.0).with_color(0.61, 0.38, 0.99),
        )
    }

    /// Coverage mask of a framebuffer drawn with a marker on a black clear
    fn covered(fb: &Framebuffer) -> Vec<bool> {
        let mut mask = Vec::with_capacity(fb.width() * fb.height());
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                mask.push(fb.get_pixel(x, y) != Some(0));
            }
        }
        mask
    }

    fn draw_flat<const B: usize>(v: &[Vertex; 3], width: usize, height: usize, parallel: bool) -> (Framebuffer, DrawStats) {
        let mut fb = Framebuffer::new(width, height, PixelFormat::XRGB8888);
        let rasterizer = Rasterizer::<_, B>::new(FlatShader { r: 255, g: 255, b: 255 })
            .with_options(RasterOptions { parallel });
        let stats = rasterizer.draw_triangle(&v[0], &v[1], &v[2], &mut fb.surface());
        (fb, stats)
    }

    #[test]
    fn test_matches_reference_scenario() {
        let (v0, v1, v2) = scenario();

        let mut fast = Framebuffer::new(640, 480, PixelFormat::XRGB8888);
        let stats = draw_triangle(&v0, &v1, &v2, &mut fast.surface());

        let mut slow = Framebuffer::new(640, 480, PixelFormat::XRGB8888);
        let flat = FlatShader { r: 255, g: 255, b: 255 };
        let expected = rasterize_reference(&flat, &v0, &v1, &v2, &mut slow.surface());

        assert_eq!(stats.pixels_shaded, expected);
        assert!(stats.blocks_full > 0 && stats.blocks_partial > 0);

        let eqn = TriangleEquation::new(&v0, &v1, &v2, 0);
        for y in 0..480 {
            for x in 0..640 {
                let reference = slow.get_pixel(x, y) != Some(0);
                let (sx, sy) = (x as f32 + 0.5, y as f32 + 0.5);
                assert_eq!(reference, eqn.contains(sx, sy), "reference at ({}, {})", x, y);
                if !reference {
                    assert_eq!(fast.get_pixel(x, y), Some(0), "extra pixel at ({}, {})", x, y);
                    continue;
                }

                let (r, g, b) = fast.get_rgb(x, y).unwrap();
                let direct = PixelData::init(&eqn, sx, sy);
                for (got, want) in [(r, direct.r), (g, direct.g), (b, direct.b)] {
                    assert!((got as i32 - to_byte(want) as i32).abs() <= 1, "color at ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_matches_reference_other_block_sizes() {
        let (v0, v1, v2) = scenario();
        let v = [v0, v1, v2];
        let mut slow = Framebuffer::new(640, 480, PixelFormat::XRGB8888);
        rasterize_reference(&FlatShader { r: 255, g: 255, b: 255 }, &v0, &v1, &v2, &mut slow.surface());
        let expected = covered(&slow);

        assert_eq!(covered(&draw_flat::<1>(&v, 640, 480, true).0), expected);
        assert_eq!(covered(&draw_flat::<8>(&v, 640, 480, true).0), expected);
        assert_eq!(covered(&draw_flat::<16>(&v, 640, 480, false).0), expected);
    }

    #[test]
    fn test_shared_edge_partition() {
        // a 20x20 square split along its diagonal; the diagonal runs
        // exactly through pixel centers
        let a = [Vertex::new(0.0, 0.0), Vertex::new(20.0, 0.0), Vertex::new(0.0, 20.0)];
        let b = [Vertex::new(20.0, 0.0), Vertex::new(20.0, 20.0), Vertex::new(0.0, 20.0)];

        let (fa, sa) = draw_flat::<4>(&a, 32, 32, true);
        let (fb, sb) = draw_flat::<4>(&b, 32, 32, true);
        let (ma, mb) = (covered(&fa), covered(&fb));

        for y in 0..32 {
            for x in 0..32 {
                let i = y * 32 + x;
                let in_square = x < 20 && y < 20;
                assert!(!(ma[i] && mb[i]), "double draw at ({}, {})", x, y);
                assert_eq!(ma[i] || mb[i], in_square, "gap at ({}, {})", x, y);
            }
        }
        assert_eq!(sa.pixels_shaded + sb.pixels_shaded, 400);
    }

    #[test]
    fn test_shared_edge_partition_uneven() {
        // diagonal shared edge that does not follow the block grid
        let p = Vertex::new(3.0, 1.0);
        let q = Vertex::new(27.0, 25.0);
        let left = [p, q, Vertex::new(2.0, 30.0)];
        let right = [q, p, Vertex::new(30.0, 2.0)];

        let (fl, _) = draw_flat::<4>(&left, 32, 32, false);
        let (fr, _) = draw_flat::<4>(&right, 32, 32, false);
        let (ml, mr) = (covered(&fl), covered(&fr));

        let el = TriangleEquation::new(&left[0], &left[1], &left[2], 0);
        let er = TriangleEquation::new(&right[0], &right[1], &right[2], 0);
        assert!(!el.is_backfacing() && !er.is_backfacing());

        for y in 0..32 {
            for x in 0..32 {
                let i = y * 32 + x;
                assert!(!(ml[i] && mr[i]), "double draw at ({}, {})", x, y);
                // points exactly on the shared edge belong to one side
                let on_edge = el.e0.evaluate(x as f32 + 0.5, y as f32 + 0.5) == 0.0;
                let inside_segment = x >= 3 && x < 27;
                if on_edge && inside_segment {
                    assert!(ml[i] || mr[i], "gap on shared edge at ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_backfacing_draws_nothing() {
        let (v0, v1, v2) = scenario();
        let mut fb = Framebuffer::new(640, 480, PixelFormat::XRGB8888);
        let stats = draw_triangle(&v0, &v2, &v1, &mut fb.surface());
        assert_eq!(stats, DrawStats::default());
        assert!(fb.pixels().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_degenerate_draws_nothing() {
        let mut fb = Framebuffer::new(64, 64, PixelFormat::XRGB8888);
        let line = [Vertex::new(1.0, 1.0), Vertex::new(30.0, 30.0), Vertex::new(60.0, 60.0)];
        let stats = draw_triangle(&line[0], &line[1], &line[2], &mut fb.surface());
        assert_eq!(stats.pixels_shaded, 0);

        let nan = Vertex::new(f32::NAN, 5.0);
        let stats = draw_triangle(&nan, &Vertex::new(40.0, 5.0), &Vertex::new(5.0, 40.0), &mut fb.surface());
        assert_eq!(stats.pixels_shaded, 0);
        assert!(fb.pixels().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_clipped_to_surface() {
        // extends past every side of a surface whose size is not a multiple of B
        let v = [Vertex::new(-40.0, -30.0), Vertex::new(90.0, -20.0), Vertex::new(10.0, 120.0)];
        let (fb, stats) = draw_flat::<4>(&v, 37, 29, true);

        let mut slow = Framebuffer::new(37, 29, PixelFormat::XRGB8888);
        let expected = rasterize_reference(&FlatShader { r: 255, g: 255, b: 255 }, &v[0], &v[1], &v[2], &mut slow.surface());
        assert_eq!(stats.pixels_shaded, expected);
        assert_eq!(covered(&fb), covered(&slow));
    }

    #[test]
    fn test_padded_surface_untouched_outside_rows() {
        let format = PixelFormat::new(ChannelLayout::Xrgb8888, ByteOrder::Little);
        let (width, height, pitch) = (10, 10, 48);
        let mut buf = vec![0xAAu8; pitch * height];
        {
            let mut surface = Surface::new(&mut buf, width, height, pitch, format).unwrap();
            let v = [Vertex::new(-5.0, -5.0), Vertex::new(30.0, -5.0), Vertex::new(-5.0, 30.0)];
            draw_flat_into(&v, &mut surface);
        }
        // row padding past width * 4 bytes is never written
        for row in buf.chunks(pitch) {
            assert!(row[width * 4..].iter().all(|b| *b == 0xAA));
        }
    }

    fn draw_flat_into(v: &[Vertex; 3], surface: &mut Surface<'_>) -> DrawStats {
        Rasterizer::<_, 4>::new(FlatShader { r: 1, g: 2, b: 3 }).draw_triangle(&v[0], &v[1], &v[2], surface)
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (v0, v1, v2) = scenario();
        let mut par = Framebuffer::new(640, 480, PixelFormat::XRGB8888);
        let mut seq = Framebuffer::new(640, 480, PixelFormat::XRGB8888);

        let parallel = Rasterizer::<ColorShader>::new(ColorShader);
        let sequential = Rasterizer::<ColorShader>::new(ColorShader).with_options(RasterOptions { parallel: false });

        let a = parallel.draw_triangle(&v0, &v1, &v2, &mut par.surface());
        let b = sequential.draw_triangle(&v0, &v1, &v2, &mut seq.surface());
        assert_eq!(a, b);
        assert_eq!(par.pixels(), seq.pixels());
    }

    #[test]
    fn test_small_triangle_inside_one_block() {
        let v = [Vertex::new(5.0, 5.0), Vertex::new(7.0, 5.0), Vertex::new(5.0, 7.0)];
        let (fb, stats) = draw_flat::<16>(&v, 32, 32, true);
        // only the pixel centered at (5.5, 5.5) lies strictly inside
        assert_eq!(stats.pixels_shaded, 1);
        assert_ne!(fb.get_pixel(5, 5), Some(0));
    }

    #[test]
    fn test_narrow_formats() {
        let (v0, v1, v2) = scenario();
        for layout in [ChannelLayout::Rgb332, ChannelLayout::Rgb565, ChannelLayout::Rgb888] {
            let mut fb = Framebuffer::new(640, 480, PixelFormat::new(layout, ByteOrder::NATIVE));
            fb.clear(Color::BLACK);
            let stats = draw_triangle(&v0, &v1, &v2, &mut fb.surface());

            let mut reference = Framebuffer::new(640, 480, PixelFormat::new(layout, ByteOrder::NATIVE));
            let expected = rasterize_reference(&FlatShader { r: 255, g: 255, b: 255 }, &v0, &v1, &v2, &mut reference.surface());
            assert_eq!(stats.pixels_shaded, expected, "{:?}", layout);
        }
    }

    struct AvarShader;

    impl PixelShader for AvarShader {
        const AVAR_COUNT: usize = 2;

        fn draw_pixel(&self, target: &mut Surface<'_>, p: &PixelData) {
            let color = target.format().map_rgb(to_byte(p.avar[0]), to_byte(p.avar[1]), 0);
            target.put_pixel(p.x as usize, p.y as usize, color);
        }
    }

    #[test]
    fn test_affine_variables_interpolated() {
        let v0 = Vertex::new(0.0, 0.0).with_avars(&[0.0, 1.0]);
        let v1 = Vertex::new(64.0, 0.0).with_avars(&[1.0, 1.0]);
        let v2 = Vertex::new(0.0, 64.0).with_avars(&[0.0, 1.0]);

        let mut fb = Framebuffer::new(64, 64, PixelFormat::XRGB8888);
        Rasterizer::<_, 4>::new(AvarShader).draw_triangle(&v0, &v1, &v2, &mut fb.surface());

        // avar[0] follows x / 64, avar[1] is constant
        let (r, g, _) = fb.get_rgb(32, 10).unwrap();
        assert!((r as i32 - to_byte(32.5 / 64.0) as i32).abs() <= 1);
        assert!(g >= 254);
    }
}
