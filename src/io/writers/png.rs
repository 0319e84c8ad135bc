use image::{ImageFormat, RgbImage};
use std::path::Path;

use crate::error::{Error, Result};

pub fn write_rgb_png(output: &Path, cols: usize, rows: usize, rgb_data: Vec<u8>) -> Result<()> {
    let img = RgbImage::from_raw(cols as u32, rows as u32, rgb_data).ok_or_else(|| {
        Error::ShapeMismatch {
            expected: format!("{} RGB bytes", cols * rows * 3),
            actual: "shorter buffer".to_string(),
        }
    })?;
    img.save_with_format(output, ImageFormat::Png)?;
    Ok(())
}
