use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use ndarray::{Array3, ArrayView3, Axis, s};
use tracing::debug;

use crate::error::{Error, Result};

fn resize_options() -> ResizeOptions {
    // Bilinear convolution widens its support when downscaling (antialiased).
    ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear))
}

/// Resize one row-major `f32` plane.
pub fn resize_f32_plane(
    data: &[f32],
    original_cols: usize,
    original_rows: usize,
    target_cols: usize,
    target_rows: usize,
) -> Result<Vec<f32>> {
    if original_cols == 0 || original_rows == 0 || target_cols == 0 || target_rows == 0 {
        return Err(Error::Resize(format!(
            "cannot resize {}x{} plane to {}x{}",
            original_cols, original_rows, target_cols, target_rows
        )));
    }
    if data.len() != original_cols * original_rows {
        return Err(Error::ShapeMismatch {
            expected: format!("{} samples", original_cols * original_rows),
            actual: format!("{} samples", data.len()),
        });
    }
    if original_cols == target_cols && original_rows == target_rows {
        return Ok(data.to_vec());
    }

    // fast_image_resize works on raw bytes in native layout
    let mut src_bytes = Vec::with_capacity(data.len() * 4);
    for &v in data {
        src_bytes.extend_from_slice(&v.to_ne_bytes());
    }

    let src_image = Image::from_vec_u8(
        original_cols as u32,
        original_rows as u32,
        src_bytes,
        PixelType::F32,
    )
    .map_err(|e| Error::Resize(e.to_string()))?;
    let mut dst_image = Image::new(target_cols as u32, target_rows as u32, PixelType::F32);

    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &resize_options())
        .map_err(|e| Error::Resize(e.to_string()))?;

    let dst_bytes = dst_image.into_vec();
    let mut out = Vec::with_capacity(dst_bytes.len() / 4);
    for chunk in dst_bytes.chunks_exact(4) {
        out.push(f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(out)
}

/// Resize every channel of an H x W x C array to `target_rows` x `target_cols`.
pub fn resize_channels(
    image: ArrayView3<'_, f32>,
    target_rows: usize,
    target_cols: usize,
) -> Result<Array3<f32>> {
    let (rows, cols, channels) = image.dim();
    debug!(
        "Resizing {}x{}x{} -> {}x{}x{}",
        rows, cols, channels, target_rows, target_cols, channels
    );

    let mut out = Array3::<f32>::zeros((target_rows, target_cols, channels));
    for (c, plane) in image.axis_iter(Axis(2)).enumerate() {
        let plane: Vec<f32> = plane.iter().copied().collect();
        let resized = resize_f32_plane(&plane, cols, rows, target_cols, target_rows)?;
        let resized = ndarray::ArrayView2::from_shape((target_rows, target_cols), &resized)
            .map_err(Error::external)?;
        out.slice_mut(s![.., .., c]).assign(&resized);
    }
    Ok(out)
}
