//! Edge-function triangle rasterizer
//!
//! Features:
//! - Edge equations with a tie-break fill rule (shared edges drawn exactly once)
//! - Block coverage classification (full blocks skip per-pixel edge tests)
//! - Incremental attribute stepping (no per-pixel divides)
//! - Row bands rasterized in parallel with rayon

mod blocks;
mod equations;
mod math;
mod render;
mod shader;
mod stepper;
mod surface;
mod types;

pub use blocks::*;
pub use equations::*;
pub use math::*;
pub use render::*;
pub use shader::*;
pub use stepper::*;
pub use surface::*;
pub use types::*;

/// Default block edge length in pixels (power of two)
pub const BLOCK_SIZE: usize = 4;
