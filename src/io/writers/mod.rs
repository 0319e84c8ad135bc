//! Writers for aged images. JPEG goes through `jpeg-encoder`, PNG through `image`.
pub mod jpeg;
pub mod png;

use std::path::Path;

use ndarray::ArrayView3;
use tracing::info;

use crate::error::{Error, Result};
use crate::types::OutputFormat;

/// Quantize an H x W x 3 array in [0, 1] to interleaved RGB bytes.
pub fn to_rgb8(image: ArrayView3<'_, f32>) -> Result<Vec<u8>> {
    if image.dim().2 != 3 {
        return Err(Error::ShapeMismatch {
            expected: "3 channels".to_string(),
            actual: format!("{} channels", image.dim().2),
        });
    }
    // iter() walks in logical (row, col, channel) order
    Ok(image
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect())
}

pub fn save_image(image: ArrayView3<'_, f32>, output: &Path, format: OutputFormat) -> Result<()> {
    let (rows, cols, _) = image.dim();
    let rgb = to_rgb8(image)?;
    match format {
        OutputFormat::JPEG => jpeg::write_rgb_jpeg(output, cols, rows, &rgb)?,
        OutputFormat::PNG => png::write_rgb_png(output, cols, rows, rgb)?,
    }
    info!("Saved {} {}x{} to {:?}", format, cols, rows, output);
    Ok(())
}
