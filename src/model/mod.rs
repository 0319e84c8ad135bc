//! Seams to the external collaborators of the pipeline: the learned aging
//! transform and the face region locator. Any runtime (native inference
//! engine, remote service, test double) plugs in by implementing these traits.
use ndarray::{Array3, ArrayView3, s};

use crate::error::BoxError;
use crate::types::BoundingBox;

/// Maps one fixed-size, age-tagged tile (T x T x (C + 2)) to a T x T x 3 tile.
///
/// Implementations must be deterministic and free of side effects; tiles of
/// one request may be submitted from several threads at once.
pub trait AgingTransform: Send + Sync {
    fn apply(&self, tile: ArrayView3<'_, f32>) -> Result<Array3<f32>, BoxError>;
}

impl<F> AgingTransform for F
where
    F: Fn(ArrayView3<'_, f32>) -> Result<Array3<f32>, BoxError> + Send + Sync,
{
    fn apply(&self, tile: ArrayView3<'_, f32>) -> Result<Array3<f32>, BoxError> {
        self(tile)
    }
}

/// Returns the colour channels of the tile unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl AgingTransform for IdentityTransform {
    fn apply(&self, tile: ArrayView3<'_, f32>) -> Result<Array3<f32>, BoxError> {
        if tile.dim().2 < 3 {
            return Err(format!("tile has {} channels, need at least 3", tile.dim().2).into());
        }
        Ok(tile.slice(s![.., .., ..3]).to_owned())
    }
}

/// Finds candidate face boxes in an H x W x C image, most likely face first.
pub trait RegionLocator {
    fn locate(&self, image: ArrayView3<'_, f32>) -> Result<Vec<BoundingBox>, BoxError>;
}

/// Locator that reports a fixed list of boxes, for callers that already know
/// where the face is.
#[derive(Debug, Clone, Default)]
pub struct FixedLocator {
    boxes: Vec<BoundingBox>,
}

impl FixedLocator {
    pub fn new(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes }
    }

    pub fn single(face: BoundingBox) -> Self {
        Self { boxes: vec![face] }
    }
}

impl RegionLocator for FixedLocator {
    fn locate(&self, _image: ArrayView3<'_, f32>) -> Result<Vec<BoundingBox>, BoxError> {
        Ok(self.boxes.clone())
    }
}
