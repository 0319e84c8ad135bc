//! High-level, ergonomic library API: age an in-memory image or a file, use the
//! process-wide blend masks, and render timelapse series across several target
//! ages. Prefer these entry points over the low-level processing modules.
use std::path::Path;

use ndarray::{Array3, ArrayView3};
use tracing::{info, warn};

use crate::core::masks::BlendMasks;
use crate::core::params::AgingParams;
use crate::core::processing::canvas::ensure_rgb;
use crate::core::processing::pipeline::{age_face, locate_face};
use crate::error::Result;
use crate::io::{load_image, save_image};
use crate::model::{AgingTransform, RegionLocator};
use crate::types::OutputFormat;

pub use crate::core::processing::pipeline::age_image;

/// Target ages sampled by a timelapse.
pub const TIMELAPSE_AGES: [u32; 5] = [10, 20, 30, 50, 70];
/// Timelapse ages closer than this to the source age are skipped.
pub const TIMELAPSE_MIN_GAP: u32 = 3;

/// Age an image using the process-wide masks installed with
/// [`BlendMasks::install_global`].
pub fn age_image_with_global_masks(
    image: ArrayView3<'_, f32>,
    locator: &dyn RegionLocator,
    transform: &dyn AgingTransform,
    params: &AgingParams,
) -> Result<Array3<f32>> {
    let masks = BlendMasks::global()?;
    age_image(image, locator, transform, masks, params)
}

/// Load `input`, age the primary face and write the result to `output`.
/// The output format follows the file extension and falls back to JPEG.
pub fn age_image_path(
    input: &Path,
    output: &Path,
    locator: &dyn RegionLocator,
    transform: &dyn AgingTransform,
    masks: &BlendMasks,
    params: &AgingParams,
) -> Result<()> {
    let image = load_image(input)?;
    let aged = age_image(image.view(), locator, transform, masks, params)?;

    let format = OutputFormat::from_path(output).unwrap_or_else(|| {
        warn!("Unknown output extension for {:?}, writing JPEG", output);
        OutputFormat::JPEG
    });
    save_image(aged.view(), output, format)
}

/// Ages rendered for a timelapse starting at `source_age`, ascending.
pub fn timelapse_ages(source_age: u32) -> Vec<u32> {
    let mut ages: Vec<u32> = TIMELAPSE_AGES
        .iter()
        .copied()
        .filter(|&age| age.abs_diff(source_age) >= TIMELAPSE_MIN_GAP)
        .collect();
    ages.push(source_age);
    ages.sort_unstable();
    ages.dedup();
    ages
}

/// One rendered timelapse frame.
#[derive(Debug, Clone)]
pub struct TimelapseFrame {
    pub age: u32,
    pub image: Array3<f32>,
}

/// Render one frame per [`timelapse_ages`] entry. The frame at the source age
/// is the (RGB-normalized) input; the face is located once and reused.
pub fn age_timelapse(
    image: ArrayView3<'_, f32>,
    source_age: u32,
    locator: &dyn RegionLocator,
    transform: &dyn AgingTransform,
    masks: &BlendMasks,
    params: &AgingParams,
) -> Result<Vec<TimelapseFrame>> {
    let face = locate_face(image, locator)?;
    let ages = timelapse_ages(source_age);
    info!("Rendering timelapse for ages {:?}", ages);

    let mut frames = Vec::with_capacity(ages.len());
    for age in ages {
        let frame = if age == source_age {
            ensure_rgb(image)?
        } else {
            let frame_params = AgingParams {
                source_age: source_age as f32,
                target_age: age as f32,
                ..params.clone()
            };
            age_face(image, &face, transform, masks, &frame_params)?
        };
        frames.push(TimelapseFrame { age, image: frame });
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoxError, Error};
    use crate::model::{FixedLocator, IdentityTransform};
    use crate::types::BoundingBox;
    use ndarray::s;

    #[test]
    fn timelapse_skips_ages_near_source() {
        assert_eq!(timelapse_ages(14), vec![10, 14, 20, 30, 50, 70]);
        assert_eq!(timelapse_ages(45), vec![10, 20, 30, 45, 50, 70]);
        assert_eq!(timelapse_ages(21), vec![10, 21, 30, 50, 70]);
        assert_eq!(timelapse_ages(30), vec![10, 20, 30, 50, 70]);
        assert_eq!(timelapse_ages(68), vec![10, 20, 30, 50, 68]);
    }

    /// Encodes the requested target age into the output so frames can be told apart.
    struct TargetAgeGray;

    impl AgingTransform for TargetAgeGray {
        fn apply(&self, tile: ArrayView3<'_, f32>) -> std::result::Result<Array3<f32>, BoxError> {
            let (h, w, _) = tile.dim();
            Ok(Array3::from_elem((h, w, 3), tile[[0, 0, 4]]))
        }
    }

    #[test]
    fn timelapse_frames_follow_ages() {
        let image = Array3::<f32>::zeros((120, 120, 3));
        let face = BoundingBox::new(40, 80, 80, 40);
        let params = AgingParams {
            input_size: 64,
            window_size: 32,
            stride: 16,
            parallel: false,
            ..AgingParams::default()
        };
        let masks = BlendMasks::uniform(64, 32);
        let frames = age_timelapse(
            image.view(),
            45,
            &FixedLocator::single(face),
            &TargetAgeGray,
            &masks,
            &params,
        )
        .unwrap();

        let ages: Vec<u32> = frames.iter().map(|f| f.age).collect();
        assert_eq!(ages, vec![10, 20, 30, 45, 50, 70]);
        for frame in &frames {
            let center = frame.image[[60, 60, 0]];
            if frame.age == 45 {
                assert_eq!(center, 0.0);
            } else {
                assert!((center - frame.age as f32 / 100.0).abs() < 1e-4);
            }
            // Corners lie outside the crop and stay black.
            assert_eq!(frame.image[[0, 0, 0]], 0.0);
        }
        assert!(frames[0].image.slice(s![.., .., 1]).iter().all(|&v| v <= 0.1 + 1e-4));
    }

    #[test]
    fn timelapse_without_face_fails() {
        let image = Array3::<f32>::zeros((50, 50, 3));
        let masks = BlendMasks::synthetic(64, 32);
        assert!(matches!(
            age_timelapse(
                image.view(),
                20,
                &FixedLocator::default(),
                &IdentityTransform,
                &masks,
                &AgingParams::default()
            ),
            Err(Error::NoFaceDetected)
        ));
    }

    #[test]
    fn age_image_path_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        image::RgbImage::from_pixel(96, 80, image::Rgb([100, 120, 140]))
            .save(&input)
            .unwrap();

        let params = AgingParams {
            input_size: 64,
            window_size: 32,
            stride: 16,
            ..AgingParams::default()
        };
        age_image_path(
            &input,
            &output,
            &FixedLocator::single(BoundingBox::new(25, 63, 55, 33)),
            &IdentityTransform,
            &BlendMasks::synthetic(64, 32),
            &params,
        )
        .unwrap();

        let written = load_image(&output).unwrap();
        assert_eq!(written.dim(), (80, 96, 3));
    }
}
