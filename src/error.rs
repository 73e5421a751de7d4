//! Rasterizer error type

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// The triangle's vertices are collinear (or not finite)
    #[error("degenerate triangle: vertices are collinear")]
    DegenerateTriangle,
    /// The pixel buffer cannot hold the described surface
    #[error("invalid surface: {0}")]
    InvalidSurface(String),
}
