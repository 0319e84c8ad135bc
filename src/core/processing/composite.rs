use ndarray::{Array3, ArrayView3, s};
use tracing::debug;

use crate::core::processing::canvas::COLOR_CHANNELS;
use crate::core::processing::resize::resize_channels;
use crate::error::{Error, Result};
use crate::types::CropRectangle;

/// Valid range of normalized pixel values.
pub const PIXEL_MIN: f32 = 0.0;
pub const PIXEL_MAX: f32 = 1.0;

/// Add the blended canvas back into `image` at `crop`.
///
/// The canvas is resized to the crop's footprint, added onto the original
/// pixels and the composited region is clamped to the valid range. Pixels
/// outside `crop` are left untouched.
pub fn composite_into(
    image: &mut Array3<f32>,
    crop: &CropRectangle,
    blended: ArrayView3<'_, f32>,
) -> Result<()> {
    let (rows, cols, channels) = image.dim();
    if channels != COLOR_CHANNELS || blended.dim().2 != COLOR_CHANNELS {
        return Err(Error::ShapeMismatch {
            expected: format!("{COLOR_CHANNELS}-channel image and canvas"),
            actual: format!("{} and {}", channels, blended.dim().2),
        });
    }
    if crop.height() == 0 || crop.width() == 0 || crop.ry > rows || crop.rx > cols {
        return Err(Error::geometry(format!(
            "crop {crop} does not fit in {cols}x{rows} image"
        )));
    }

    let restored = resize_channels(blended, crop.height(), crop.width())?;
    debug!("Compositing {}x{} patch at {}", crop.width(), crop.height(), crop);

    let mut region = image.slice_mut(s![crop.ly..crop.ry, crop.lx..crop.rx, ..]);
    region += &restored;
    region.mapv_inplace(|v| v.clamp(PIXEL_MIN, PIXEL_MAX));
    Ok(())
}

/// Non-mutating variant of [`composite_into`].
pub fn composite(
    image: ArrayView3<'_, f32>,
    crop: &CropRectangle,
    blended: ArrayView3<'_, f32>,
) -> Result<Array3<f32>> {
    let mut out = image.to_owned();
    composite_into(&mut out, crop, blended)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(rows: usize, cols: usize) -> Array3<f32> {
        Array3::from_shape_fn((rows, cols, 3), |(y, x, c)| ((y * 31 + x * 17 + c * 5) % 97) as f32 / 97.0)
    }

    #[test]
    fn outside_crop_is_untouched() {
        let image = pattern(50, 70);
        let crop = CropRectangle { ly: 10, ry: 40, lx: 20, rx: 50 };
        let blended = Array3::from_elem((64, 64, 3), 0.3f32);
        let out = composite(image.view(), &crop, blended.view()).unwrap();
        for ((y, x, c), &v) in out.indexed_iter() {
            if !crop.contains(y, x) {
                assert_eq!(v.to_bits(), image[[y, x, c]].to_bits());
            }
        }
    }

    #[test]
    fn inside_crop_is_added_and_clamped() {
        let image = Array3::from_elem((20, 20, 3), 0.5f32);
        let crop = CropRectangle { ly: 4, ry: 12, lx: 4, rx: 12 };

        let lift = Array3::from_elem((16, 16, 3), 0.25f32);
        let out = composite(image.view(), &crop, lift.view()).unwrap();
        assert!((out[[8, 8, 0]] - 0.75).abs() < 1e-5);

        let blowout = Array3::from_elem((16, 16, 3), 5.0f32);
        let out = composite(image.view(), &crop, blowout.view()).unwrap();
        assert_eq!(out[[8, 8, 1]], 1.0);

        let negative = Array3::from_elem((16, 16, 3), -3.0f32);
        let out = composite(image.view(), &crop, negative.view()).unwrap();
        assert_eq!(out[[8, 8, 2]], 0.0);
    }

    #[test]
    fn rejects_crop_outside_image() {
        let mut image = Array3::<f32>::zeros((10, 10, 3));
        let crop = CropRectangle { ly: 5, ry: 15, lx: 0, rx: 10 };
        let blended = Array3::<f32>::zeros((8, 8, 3));
        assert!(matches!(
            composite_into(&mut image, &crop, blended.view()),
            Err(Error::InvalidGeometry { .. })
        ));
    }
}
