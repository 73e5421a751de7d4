//! Edgeraster: block-classified edge-function triangle rasterizer
//!
//! - Exact coverage with a tie-break fill rule
//! - Gouraud color and affine variable interpolation by finite differences
//! - 8/16/24/32-bit destination surfaces
//! - RON configuration and PNG snapshots for the demo host

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod error;
pub mod rasterizer;
pub mod snapshot;

pub use error::RasterError;
pub use rasterizer::{barycentric, draw_triangle, BaryCoords, DrawStats, Rasterizer, Surface, Vertex};
