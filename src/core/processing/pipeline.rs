use ndarray::{Array3, ArrayView3};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::masks::BlendMasks;
use crate::core::params::AgingParams;
use crate::core::processing::blend::{TileBlender, plan_tiles};
use crate::core::processing::canvas::{build_working_canvas, ensure_rgb};
use crate::core::processing::composite::composite_into;
use crate::core::processing::crop::plan_crop;
use crate::error::{Error, Result};
use crate::model::{AgingTransform, RegionLocator};
use crate::types::{BoundingBox, CropRectangle, TilePlacement};

/// Geometry of one request: where the crop lands and which tiles are scanned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPlan {
    pub image_height: usize,
    pub image_width: usize,
    pub face: BoundingBox,
    pub crop: CropRectangle,
    pub canvas_size: usize,
    pub window_size: usize,
    pub stride: usize,
    pub tiles: Vec<TilePlacement>,
}

/// Compute the crop and tile layout without running the transform.
pub fn plan_request(
    image_height: usize,
    image_width: usize,
    face: &BoundingBox,
    params: &AgingParams,
) -> Result<RequestPlan> {
    params.validate()?;
    let crop = plan_crop(image_height, image_width, face)?;
    let tiles = plan_tiles(
        params.input_size,
        params.input_size,
        params.window_size,
        params.stride,
    )?;
    Ok(RequestPlan {
        image_height,
        image_width,
        face: *face,
        crop,
        canvas_size: params.input_size,
        window_size: params.window_size,
        stride: params.stride,
        tiles,
    })
}

/// First box reported by the locator; `NoFaceDetected` if there is none.
pub fn locate_face(image: ArrayView3<'_, f32>, locator: &dyn RegionLocator) -> Result<BoundingBox> {
    let boxes = locator
        .locate(image)
        .map_err(|e| Error::Locator(e.to_string()))?;
    if boxes.len() > 1 {
        debug!("Locator returned {} boxes, using the first", boxes.len());
    }
    boxes.into_iter().next().ok_or(Error::NoFaceDetected)
}

/// Age the face inside `face`: crop, blend the transform tile by tile and
/// composite the result back into a copy of `image`.
pub fn age_face(
    image: ArrayView3<'_, f32>,
    face: &BoundingBox,
    transform: &dyn AgingTransform,
    masks: &BlendMasks,
    params: &AgingParams,
) -> Result<Array3<f32>> {
    params.validate()?;
    let mut output = ensure_rgb(image)?;
    let (rows, cols, _) = output.dim();

    let crop = plan_crop(rows, cols, face)?;
    info!(
        "Aging face {} -> crop {} (ages {} -> {})",
        face, crop, params.source_age, params.target_age
    );

    let blended = {
        let canvas = build_working_canvas(output.view(), &crop, params)?;
        TileBlender::new(masks, params.window_size, params.stride)?
            .with_parallel(params.parallel)
            .blend(canvas.view(), transform)?
    };

    composite_into(&mut output, &crop, blended.view())?;
    Ok(output)
}

/// Locate the primary face with `locator`, then run [`age_face`].
pub fn age_image(
    image: ArrayView3<'_, f32>,
    locator: &dyn RegionLocator,
    transform: &dyn AgingTransform,
    masks: &BlendMasks,
    params: &AgingParams,
) -> Result<Array3<f32>> {
    let face = locate_face(image, locator)?;
    age_face(image, &face, transform, masks, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::model::{FixedLocator, IdentityTransform};

    fn small_params() -> AgingParams {
        AgingParams {
            source_age: 30.0,
            target_age: 60.0,
            input_size: 64,
            window_size: 32,
            stride: 16,
            parallel: false,
        }
    }

    struct FailingLocator;

    impl RegionLocator for FailingLocator {
        fn locate(&self, _: ArrayView3<'_, f32>) -> std::result::Result<Vec<BoundingBox>, BoxError> {
            Err("detector crashed".into())
        }
    }

    #[test]
    fn empty_locator_result_is_no_face() {
        let image = Array3::<f32>::zeros((100, 100, 3));
        let masks = BlendMasks::synthetic(64, 32);
        let err = age_image(
            image.view(),
            &FixedLocator::default(),
            &IdentityTransform,
            &masks,
            &small_params(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NoFaceDetected));
    }

    #[test]
    fn locator_errors_are_surfaced() {
        let image = Array3::<f32>::zeros((10, 10, 3));
        assert!(matches!(
            locate_face(image.view(), &FailingLocator),
            Err(Error::Locator(msg)) if msg.contains("crashed")
        ));
    }

    #[test]
    fn first_box_wins() {
        let image = Array3::<f32>::zeros((10, 10, 3));
        let a = BoundingBox::new(1, 5, 5, 1);
        let b = BoundingBox::new(2, 6, 6, 2);
        let locator = FixedLocator::new(vec![a, b]);
        assert_eq!(locate_face(image.view(), &locator).unwrap(), a);
    }

    #[test]
    fn grayscale_input_yields_rgb_output() {
        let image = Array3::from_elem((120, 100, 1), 0.2f32);
        let face = BoundingBox::new(40, 70, 80, 30);
        let masks = BlendMasks::synthetic(64, 32);
        let out = age_face(image.view(), &face, &IdentityTransform, &masks, &small_params()).unwrap();
        assert_eq!(out.dim(), (120, 100, 3));
        assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn plan_reports_crop_and_tiles() {
        let plan = plan_request(1000, 800, &BoundingBox::new(100, 350, 300, 150), &AgingParams::default())
            .unwrap();
        assert_eq!(plan.crop.height(), plan.crop.width());
        assert_eq!(plan.tiles.len(), 9);
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"tiles\""));
    }

    #[test]
    fn mismatched_masks_are_rejected() {
        let image = Array3::<f32>::zeros((100, 100, 3));
        let face = BoundingBox::new(30, 70, 70, 30);
        let masks = BlendMasks::synthetic(128, 32);
        assert!(matches!(
            age_face(image.view(), &face, &IdentityTransform, &masks, &small_params()),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
