//! Blend masks: the per-tile weight window that hides seams between
//! overlapping tiles, and the full-canvas mask that fades the transformed
//! region out towards the crop border.
//!
//! Masks are constant for the lifetime of the process. Load or synthesize them
//! once at startup, optionally install them as the process-wide instance with
//! [`BlendMasks::install_global`], and share them read-only between requests.
use std::f32::consts::PI;
use std::path::Path;

use ndarray::Array2;
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::core::processing::resize::resize_f32_plane;
use crate::error::{Error, Result};

static GLOBAL_MASKS: OnceCell<BlendMasks> = OnceCell::new();

/// Radius (relative to the half-size) inside which the canvas mask is fully opaque.
const FULL_MASK_INNER_RADIUS: f32 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct BlendMasks {
    full: Array2<f32>,
    tile: Array2<f32>,
}

fn check_mask(name: &str, mask: &Array2<f32>) -> Result<()> {
    let (rows, cols) = mask.dim();
    if rows == 0 || rows != cols {
        return Err(Error::ShapeMismatch {
            expected: format!("non-empty square {name} mask"),
            actual: format!("{rows}x{cols}"),
        });
    }
    if mask.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidArgument {
            arg: "mask",
            value: format!("{name} mask contains non-finite values"),
        });
    }
    Ok(())
}

/// Load a grayscale mask image, normalized to [0, 1].
pub fn load_gray_mask(path: &Path) -> Result<Array2<f32>> {
    let gray = image::open(path)?.to_luma8();
    let (w, h) = gray.dimensions();
    let data: Vec<f32> = gray.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();
    Array2::from_shape_vec((h as usize, w as usize), data).map_err(Error::external)
}

fn resize_mask(mask: &Array2<f32>, size: usize) -> Result<Array2<f32>> {
    let (rows, cols) = mask.dim();
    let data: Vec<f32> = mask.iter().copied().collect();
    let resized = resize_f32_plane(&data, cols, rows, size, size)?;
    let mut out = Array2::from_shape_vec((size, size), resized).map_err(Error::external)?;
    out.mapv_inplace(|v| v.clamp(0.0, 1.0));
    Ok(out)
}

impl BlendMasks {
    /// Build masks from arrays. Both must be square; values are clamped into [0, 1].
    pub fn new(mut full: Array2<f32>, mut tile: Array2<f32>) -> Result<Self> {
        check_mask("full-canvas", &full)?;
        check_mask("tile", &tile)?;
        full.mapv_inplace(|v| v.clamp(0.0, 1.0));
        tile.mapv_inplace(|v| v.clamp(0.0, 1.0));
        Ok(Self { full, tile })
    }

    /// Load both masks from grayscale image files.
    pub fn load(full_path: &Path, tile_path: &Path) -> Result<Self> {
        info!("Loading blend masks: full={:?}, tile={:?}", full_path, tile_path);
        let full = load_gray_mask(full_path)?;
        let tile = load_gray_mask(tile_path)?;
        Self::new(full, tile)
    }

    /// Built-in masks: a separable sine window per tile and a soft-edged
    /// ellipse over the canvas.
    ///
    /// With a stride of half the tile size the sine windows of overlapping
    /// tiles sum to at least 1 wherever two tiles overlap on both axes.
    pub fn synthetic(canvas_size: usize, tile_size: usize) -> Self {
        let taper: Vec<f32> = (0..tile_size)
            .map(|u| (PI * (u as f32 + 0.5) / tile_size as f32).sin())
            .collect();
        let tile = Array2::from_shape_fn((tile_size, tile_size), |(y, x)| taper[y] * taper[x]);

        let half = canvas_size as f32 / 2.0;
        let full = Array2::from_shape_fn((canvas_size, canvas_size), |(y, x)| {
            let dy = (y as f32 + 0.5 - half) / half;
            let dx = (x as f32 + 0.5 - half) / half;
            let r = (dy * dy + dx * dx).sqrt();
            if r <= FULL_MASK_INNER_RADIUS {
                1.0
            } else if r >= 1.0 {
                0.0
            } else {
                // smoothstep from the inner radius (1) to the rim (0)
                let t = (1.0 - r) / (1.0 - FULL_MASK_INNER_RADIUS);
                t * t * (3.0 - 2.0 * t)
            }
        });
        Self { full, tile }
    }

    /// Masks that weight every pixel equally; blending then reduces to a plain
    /// average of overlapping tiles.
    pub fn uniform(canvas_size: usize, tile_size: usize) -> Self {
        Self {
            full: Array2::ones((canvas_size, canvas_size)),
            tile: Array2::ones((tile_size, tile_size)),
        }
    }

    /// Resize any mask whose resolution differs from the requested one.
    pub fn fit(self, canvas_size: usize, tile_size: usize) -> Result<Self> {
        let full = if self.canvas_size() != canvas_size {
            warn!(
                "Full-canvas mask is {}px, resizing to {}px",
                self.canvas_size(),
                canvas_size
            );
            resize_mask(&self.full, canvas_size)?
        } else {
            self.full
        };
        let tile = if self.tile.nrows() != tile_size {
            warn!(
                "Tile mask is {}px, resizing to {}px",
                self.tile.nrows(),
                tile_size
            );
            resize_mask(&self.tile, tile_size)?
        } else {
            self.tile
        };
        Ok(Self { full, tile })
    }

    pub fn full(&self) -> &Array2<f32> {
        &self.full
    }

    pub fn tile(&self) -> &Array2<f32> {
        &self.tile
    }

    pub fn canvas_size(&self) -> usize {
        self.full.nrows()
    }

    pub fn tile_size(&self) -> usize {
        self.tile.nrows()
    }

    /// Install these masks as the process-wide instance. Fails if masks were
    /// already installed.
    pub fn install_global(self) -> Result<&'static BlendMasks> {
        GLOBAL_MASKS
            .set(self)
            .map_err(|_| Error::MasksAlreadyInstalled)?;
        Self::global()
    }

    /// The process-wide masks installed with [`BlendMasks::install_global`].
    pub fn global() -> Result<&'static BlendMasks> {
        GLOBAL_MASKS.get().ok_or(Error::MasksNotInstalled)
    }
}
