//! PNG snapshots of a framebuffer

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::rasterizer::Framebuffer;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("framebuffer {0}x{1} is too large for an image")]
    TooLarge(usize, usize),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Convert any framebuffer format to 8-bit RGBA (opaque)
pub fn to_rgba_image(fb: &Framebuffer) -> Result<RgbaImage, SnapshotError> {
    let too_large = || SnapshotError::TooLarge(fb.width(), fb.height());
    let width = u32::try_from(fb.width()).map_err(|_| too_large())?;
    let height = u32::try_from(fb.height()).map_err(|_| too_large())?;

    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let (r, g, b) = fb.get_rgb(x as usize, y as usize).unwrap_or((0, 0, 0));
        Rgba([r, g, b, 255])
    }))
}

/// Write the framebuffer to a PNG file
pub fn save_png<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), SnapshotError> {
    let img = to_rgba_image(fb)?;
    img.save_with_format(path.as_ref(), ImageFormat::Png)?;
    log::info!("Saved snapshot: {} ({}x{})", path.as_ref().display(), fb.width(), fb.height());
    Ok(())
}
