//! Sliding-window tile blending.
//!
//! The working canvas is scanned row-major with overlapping `window_size`
//! tiles. Every tile goes through the transform; outputs are weighted by the
//! tile mask and accumulated together with the weights, then normalized by the
//! accumulated weight (floored at 1.0) and multiplied by the full-canvas mask.
//!
//! With the `parallel` feature the tiles of one row are transformed on the
//! rayon pool. Accumulation always happens afterwards in scan order, so the
//! result does not depend on how the transforms were scheduled.
use ndarray::{Array2, Array3, ArrayView3, Axis, Zip, s};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::masks::BlendMasks;
use crate::core::processing::canvas::COLOR_CHANNELS;
use crate::error::{Error, Result};
use crate::model::AgingTransform;
use crate::types::TilePlacement;

/// Tile origins along one axis of length `size`.
///
/// Origins follow `range(0, size - window + add, stride)` with `add = 2` when
/// the stride does not divide the window and `1` otherwise. Origins whose tile
/// would cross the far edge are dropped, and a boundary origin `size - window`
/// is appended whenever the last tile stops short of the edge.
pub fn axis_origins(size: usize, window_size: usize, stride: usize) -> Result<Vec<usize>> {
    if window_size == 0 {
        return Err(Error::InvalidArgument {
            arg: "window_size",
            value: window_size.to_string(),
        });
    }
    if stride == 0 || stride > window_size {
        return Err(Error::InvalidArgument {
            arg: "stride",
            value: format!("{} (window_size {})", stride, window_size),
        });
    }
    if size < window_size {
        return Err(Error::InvalidArgument {
            arg: "canvas_size",
            value: format!("{} (window_size {})", size, window_size),
        });
    }

    let add = if window_size % stride != 0 { 2 } else { 1 };
    let end = size - window_size + add;
    let mut origins: Vec<usize> = (0..end)
        .step_by(stride)
        .filter(|&o| o + window_size <= size)
        .collect();
    if origins.last().map(|&o| o + window_size) != Some(size) {
        origins.push(size - window_size);
    }
    Ok(origins)
}

/// All tile placements on a `rows` x `cols` canvas, in scan order.
pub fn plan_tiles(
    rows: usize,
    cols: usize,
    window_size: usize,
    stride: usize,
) -> Result<Vec<TilePlacement>> {
    let ys = axis_origins(rows, window_size, stride)?;
    let xs = axis_origins(cols, window_size, stride)?;
    Ok(ys
        .iter()
        .flat_map(|&y| xs.iter().map(move |&x| TilePlacement { y, x }))
        .collect())
}

/// Weighted output and coverage sums over the canvas.
struct Accumulators {
    output_sum: Array3<f32>,
    weight_sum: Array2<f32>,
}

impl Accumulators {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            output_sum: Array3::zeros((rows, cols, COLOR_CHANNELS)),
            weight_sum: Array2::zeros((rows, cols)),
        }
    }

    fn add(&mut self, at: TilePlacement, tile_output: &Array3<f32>, tile_mask: &Array2<f32>) {
        let t = tile_mask.nrows();
        let mask = tile_mask.view().insert_axis(Axis(2));
        let mut region = self
            .output_sum
            .slice_mut(s![at.y..at.y + t, at.x..at.x + t, ..]);
        Zip::from(&mut region)
            .and(tile_output)
            .and_broadcast(mask)
            .for_each(|o, &v, &w| *o += v * w);

        let mut weights = self.weight_sum.slice_mut(s![at.y..at.y + t, at.x..at.x + t]);
        weights += tile_mask;
    }

    fn normalize(mut self, full_mask: &Array2<f32>) -> Array3<f32> {
        self.weight_sum.mapv_inplace(|w| w.max(1.0));
        let weights = self.weight_sum.view().insert_axis(Axis(2));
        let mask = full_mask.view().insert_axis(Axis(2));
        Zip::from(&mut self.output_sum)
            .and_broadcast(weights)
            .and_broadcast(mask)
            .for_each(|o, &w, &m| *o = *o / w * m);
        self.output_sum
    }
}

/// Runs a transform over a working canvas tile by tile and blends the results.
#[derive(Debug, Clone, Copy)]
pub struct TileBlender<'a> {
    masks: &'a BlendMasks,
    window_size: usize,
    stride: usize,
    parallel: bool,
}

impl<'a> TileBlender<'a> {
    pub fn new(masks: &'a BlendMasks, window_size: usize, stride: usize) -> Result<Self> {
        if masks.tile_size() != window_size {
            return Err(Error::ShapeMismatch {
                expected: format!("{0}x{0} tile mask", window_size),
                actual: format!("{0}x{0}", masks.tile_size()),
            });
        }
        // Validates the stride against the window.
        axis_origins(window_size, window_size, stride)?;
        Ok(Self {
            masks,
            window_size,
            stride,
            parallel: false,
        })
    }

    /// Transform the tiles of each row concurrently. Ignored without the
    /// `parallel` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn run_tile(
        &self,
        canvas: ArrayView3<'_, f32>,
        at: TilePlacement,
        transform: &dyn AgingTransform,
    ) -> Result<Array3<f32>> {
        let t = self.window_size;
        let tile = canvas.slice(s![at.y..at.y + t, at.x..at.x + t, ..]);
        let output = transform
            .apply(tile)
            .map_err(|e| Error::TransformFailure {
                y: at.y,
                x: at.x,
                reason: e.to_string(),
            })?;

        if output.dim() != (t, t, COLOR_CHANNELS) {
            return Err(Error::TransformFailure {
                y: at.y,
                x: at.x,
                reason: format!(
                    "expected {}x{}x{} output, got {:?}",
                    t,
                    t,
                    COLOR_CHANNELS,
                    output.dim()
                ),
            });
        }
        if output.iter().any(|v| !v.is_finite()) {
            return Err(Error::TransformFailure {
                y: at.y,
                x: at.x,
                reason: "output contains non-finite values".to_string(),
            });
        }
        Ok(output)
    }

    fn transform_row(
        &self,
        canvas: ArrayView3<'_, f32>,
        row: &[TilePlacement],
        transform: &dyn AgingTransform,
    ) -> Result<Vec<Array3<f32>>> {
        #[cfg(feature = "parallel")]
        if self.parallel {
            return row
                .par_iter()
                .map(|&at| self.run_tile(canvas, at, transform))
                .collect();
        }
        row.iter()
            .map(|&at| self.run_tile(canvas, at, transform))
            .collect()
    }

    /// Blend `transform` over `canvas` (S x S x C) into an S x S x 3 result.
    pub fn blend(
        &self,
        canvas: ArrayView3<'_, f32>,
        transform: &dyn AgingTransform,
    ) -> Result<Array3<f32>> {
        let (rows, cols, _) = canvas.dim();
        if rows != self.masks.canvas_size() || cols != self.masks.canvas_size() {
            return Err(Error::ShapeMismatch {
                expected: format!("{0}x{0} canvas", self.masks.canvas_size()),
                actual: format!("{}x{}", cols, rows),
            });
        }

        let ys = axis_origins(rows, self.window_size, self.stride)?;
        let xs = axis_origins(cols, self.window_size, self.stride)?;
        info!(
            "Blending {} tiles ({}x{}, window {}, stride {})",
            ys.len() * xs.len(),
            ys.len(),
            xs.len(),
            self.window_size,
            self.stride
        );
        #[cfg(not(feature = "parallel"))]
        if self.parallel {
            debug!("Parallel tile transforms requested without the `parallel` feature; running sequentially");
        }

        let mut acc = Accumulators::new(rows, cols);
        for &y in &ys {
            let row: Vec<TilePlacement> = xs.iter().map(|&x| TilePlacement { y, x }).collect();
            let outputs = self.transform_row(canvas, &row, transform)?;
            for (at, output) in row.iter().zip(&outputs) {
                acc.add(*at, output, self.masks.tile());
            }
            debug!("Accumulated tile row y={}", y);
        }

        Ok(acc.normalize(self.masks.full()))
    }
}
