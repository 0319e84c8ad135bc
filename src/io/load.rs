use std::path::Path;

use image::{DynamicImage, Rgb32FImage};
use ndarray::Array3;
use tracing::info;

use crate::error::{Error, Result};

/// Convert a float RGB image buffer into an H x W x 3 array.
pub fn array_from_rgb32f(rgb: Rgb32FImage) -> Result<Array3<f32>> {
    let (w, h) = rgb.dimensions();
    Array3::from_shape_vec((h as usize, w as usize, 3), rgb.into_raw()).map_err(Error::external)
}

/// Decode an image file into an H x W x 3 array with values in [0, 1].
/// Grayscale inputs are expanded to three channels and alpha is dropped.
pub fn load_image(path: &Path) -> Result<Array3<f32>> {
    let decoded: DynamicImage = image::open(path)?;
    info!(
        "Loaded {:?}: {}x{} ({:?})",
        path,
        decoded.width(),
        decoded.height(),
        decoded.color()
    );
    array_from_rgb32f(decoded.to_rgb32f())
}
