//! Block coverage classification
//!
//! The bounding box is cut into B x B pixel blocks and each block is tested
//! against the edges at its four corner pixel centers. Half-planes are convex,
//! so corners passing an edge means the whole block passes it.

use super::equations::TriangleEquation;
use super::stepper::EdgeData;
use super::types::Vertex;

/// All three edge bits of [`EdgeData::mask`]
const ALL_EDGES: u8 = 0b111;

/// Inclusive pixel-index rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl BoundingBox {
    /// Pixels that may hold samples of the triangle, clipped to a
    /// `width` x `height` destination. None if nothing is on screen.
    pub fn of_triangle(v0: &Vertex, v1: &Vertex, v2: &Vertex, width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let min_x = v0.x.min(v1.x).min(v2.x).floor();
        let max_x = v0.x.max(v1.x).max(v2.x).floor();
        let min_y = v0.y.min(v1.y).min(v2.y).floor();
        let max_y = v0.y.max(v1.y).max(v2.y).floor();

        if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite()) {
            return None;
        }
        if max_x < 0.0 || max_y < 0.0 || min_x >= width as f32 || min_y >= height as f32 {
            return None;
        }

        Some(Self {
            min_x: min_x.max(0.0) as usize,
            min_y: min_y.max(0.0) as usize,
            max_x: (max_x as usize).min(width - 1),
            max_y: (max_y as usize).min(height - 1),
        })
    }

    /// Grow outward to whole blocks of `block` pixels (a power of two).
    /// The result may extend past the destination; callers clip per block.
    pub fn aligned(self, block: usize) -> Self {
        debug_assert!(block.is_power_of_two());
        let mask = block - 1;
        Self {
            min_x: self.min_x & !mask,
            min_y: self.min_y & !mask,
            max_x: self.max_x | mask,
            max_y: self.max_y | mask,
        }
    }

    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }
}

/// How a block relates to the triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Some edge rejects every corner; nothing to draw
    Outside,
    /// Every corner passes every edge; draw without edge tests
    Full,
    /// Straddles an edge; test each pixel
    Partial,
}

/// Classify the block whose top-left pixel center is (x, y)
pub fn classify_block(eqn: &TriangleEquation, x: f32, y: f32, block: usize) -> Coverage {
    let s = (block - 1) as f32;

    let e00 = EdgeData::init(eqn, x, y);
    let mut e10 = e00;
    e10.step_x_by(eqn, s);
    let mut e01 = e00;
    e01.step_y_by(eqn, s);
    let mut e11 = e01;
    e11.step_x_by(eqn, s);

    let masks = [e00.mask(eqn), e10.mask(eqn), e01.mask(eqn), e11.mask(eqn)];
    let passes_somewhere = masks.iter().fold(0, |acc, m| acc | m);
    let passes_everywhere = masks.iter().fold(ALL_EDGES, |acc, m| acc & m);

    if passes_somewhere != ALL_EDGES {
        Coverage::Outside
    } else if passes_everywhere == ALL_EDGES {
        Coverage::Full
    } else {
        Coverage::Partial
    }
}

/// Row-major classification of every block in an aligned bounding box
#[derive(Debug, Clone)]
pub struct BlockGrid {
    pub block: usize,
    pub origin_x: usize,
    pub origin_y: usize,
    pub cols: usize,
    pub rows: usize,
    cells: Vec<Coverage>,
}

impl BlockGrid {
    /// Classify all blocks of `bbox`, which must already be aligned to `block`
    pub fn classify(eqn: &TriangleEquation, bbox: &BoundingBox, block: usize) -> Self {
        let cols = bbox.width() / block;
        let rows = bbox.height() / block;

        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            let y = (bbox.min_y + row * block) as f32 + 0.5;
            for col in 0..cols {
                let x = (bbox.min_x + col * block) as f32 + 0.5;
                cells.push(classify_block(eqn, x, y, block));
            }
        }

        Self {
            block,
            origin_x: bbox.min_x,
            origin_y: bbox.min_y,
            cols,
            rows,
            cells,
        }
    }

    pub fn get(&self, col: usize, row: usize) -> Coverage {
        self.cells[row * self.cols + col]
    }

    /// Blocks of one block row, left to right
    pub fn row(&self, row: usize) -> &[Coverage] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Number of (outside, full, partial) blocks
    pub fn counts(&self) -> (usize, usize, usize) {
        self.cells.iter().fold((0, 0, 0), |(o, f, p), c| match c {
            Coverage::Outside => (o + 1, f, p),
            Coverage::Full => (o, f + 1, p),
            Coverage::Partial => (o, f, p + 1),
        })
    }
}
