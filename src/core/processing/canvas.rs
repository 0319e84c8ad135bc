use ndarray::{Array3, ArrayView3, Axis, s};
use tracing::debug;

use crate::core::params::AgingParams;
use crate::core::processing::resize::resize_channels;
use crate::error::{Error, Result};
use crate::types::CropRectangle;

/// Number of colour channels the transform consumes.
pub const COLOR_CHANNELS: usize = 3;
/// Colour channels plus the source-age and target-age channels.
pub const CANVAS_CHANNELS: usize = COLOR_CHANNELS + 2;

/// Normalize an H x W x C image to three colour channels: grayscale is
/// broadcast, a fourth (alpha) channel is dropped.
pub fn ensure_rgb(image: ArrayView3<'_, f32>) -> Result<Array3<f32>> {
    let (rows, cols, channels) = image.dim();
    match channels {
        1 => {
            let gray = image.index_axis(Axis(2), 0);
            Ok(Array3::from_shape_fn((rows, cols, COLOR_CHANNELS), |(y, x, _)| {
                gray[[y, x]]
            }))
        }
        3 => Ok(image.to_owned()),
        4 => Ok(image.slice(s![.., .., ..COLOR_CHANNELS]).to_owned()),
        other => Err(Error::ShapeMismatch {
            expected: "1, 3 or 4 channels".to_string(),
            actual: format!("{other} channels"),
        }),
    }
}

/// Cut `crop` out of an RGB image, resize it to the model input resolution
/// and append the two age channels.
pub fn build_working_canvas(
    image: ArrayView3<'_, f32>,
    crop: &CropRectangle,
    params: &AgingParams,
) -> Result<Array3<f32>> {
    let (rows, cols, channels) = image.dim();
    if channels != COLOR_CHANNELS {
        return Err(Error::ShapeMismatch {
            expected: format!("{COLOR_CHANNELS} channels"),
            actual: format!("{channels} channels"),
        });
    }
    if crop.height() == 0 || crop.width() == 0 || crop.ry > rows || crop.rx > cols {
        return Err(Error::geometry(format!(
            "crop {crop} does not fit in {cols}x{rows} image"
        )));
    }

    let size = params.input_size;
    let cropped = image.slice(s![crop.ly..crop.ry, crop.lx..crop.rx, ..]);
    let resized = resize_channels(cropped, size, size)?;

    let mut canvas = Array3::<f32>::zeros((size, size, CANVAS_CHANNELS));
    canvas
        .slice_mut(s![.., .., ..COLOR_CHANNELS])
        .assign(&resized);
    canvas
        .slice_mut(s![.., .., COLOR_CHANNELS])
        .fill(params.source_age_channel());
    canvas
        .slice_mut(s![.., .., COLOR_CHANNELS + 1])
        .fill(params.target_age_channel());

    debug!(
        "Working canvas {}x{}x{} from crop {}",
        size, size, CANVAS_CHANNELS, crop
    );
    Ok(canvas)
}
