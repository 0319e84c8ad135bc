#![doc = r#"
AGESHIFT: seam-free, tiled application of face aging transforms.

Aging models typically run on a fixed-size square input. This crate takes an
arbitrary-resolution image and a face box, cuts out a square crop around the
face, resizes it to the model resolution, runs the model over overlapping tiles
and blends them back together with weight masks, then composites the result
into the original image at its original scale.

The model and the face detector are not part of this crate. Plug them in by
implementing [`AgingTransform`] and [`RegionLocator`].

Stability
---------
The public library API is experimental in initial releases and may evolve.

Add dependency
--------------
```toml
[dependencies]
ageshift = "0.1"
```

Quick start: age an in-memory image
-----------------------------------
```rust
use ndarray::{Array3, ArrayView3, s};
use ageshift::{
    age_image, AgingParams, AgingTransform, BlendMasks, BoundingBox, BoxError, FixedLocator,
};

/// Stand-in for a real model runtime.
struct Brighten;

impl AgingTransform for Brighten {
    fn apply(&self, tile: ArrayView3<'_, f32>) -> Result<Array3<f32>, BoxError> {
        Ok(tile.slice(s![.., .., ..3]).mapv(|v| v * 0.1))
    }
}

fn main() -> ageshift::Result<()> {
    let params = AgingParams {
        input_size: 128,
        window_size: 64,
        stride: 32,
        ..AgingParams::with_ages(25.0, 60.0)
    };
    let masks = BlendMasks::synthetic(params.input_size, params.window_size);
    let image = Array3::<f32>::from_elem((240, 200, 3), 0.5);
    let locator = FixedLocator::single(BoundingBox::new(80, 140, 160, 60));

    let aged = age_image(image.view(), &locator, &Brighten, &masks, &params)?;
    assert_eq!(aged.dim(), (240, 200, 3));
    Ok(())
}
```

Process-wide masks
------------------
Blend masks are constant. Load them once at startup and share them:

```rust,no_run
use std::path::Path;
use ageshift::BlendMasks;

fn main() -> ageshift::Result<()> {
    BlendMasks::load(Path::new("assets/mask1024.jpg"), Path::new("assets/mask512.jpg"))?
        .install_global()?;
    // later, from any thread:
    let masks = BlendMasks::global()?;
    assert_eq!(masks.tile_size(), 512);
    Ok(())
}
```

Error handling
--------------
All public functions return `ageshift::Result<T>`. A request either yields a
complete image or fails; match on `ageshift::Error` for the cause:

```rust,no_run
use ageshift::Error;

fn report(result: ageshift::Result<()>) {
    match result {
        Ok(()) => {}
        Err(Error::NoFaceDetected) => eprintln!("no face in image"),
        Err(Error::TransformFailure { y, x, reason }) => {
            eprintln!("tile ({y}, {x}) failed: {reason}")
        }
        Err(other) => eprintln!("aging failed: {other}"),
    }
}
```

Feature flags
-------------
- `parallel` (default): transform the tiles of each row concurrently on the
  rayon pool. Results are bit-identical to sequential runs.

Useful modules
--------------
- [`api`]: high-level entry points (files, global masks, timelapse).
- [`core`]: crop planning, canvas construction, tile blending, compositing.
- [`model`]: the transform and locator traits.
- [`io`]: image loading and JPEG/PNG writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod model;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::masks::BlendMasks;
pub use crate::core::params::AgingParams;
pub use error::{BoxError, Error, Result};
pub use types::{BoundingBox, CropRectangle, OutputFormat, TilePlacement};

// Collaborator seams
pub use model::{AgingTransform, FixedLocator, IdentityTransform, RegionLocator};

// Processing stages
pub use crate::core::processing::blend::{TileBlender, axis_origins, plan_tiles};
pub use crate::core::processing::composite::{composite, composite_into};
pub use crate::core::processing::crop::plan_crop;
pub use crate::core::processing::pipeline::{RequestPlan, age_face, locate_face, plan_request};

// High-level API re-exports
pub use api::{
    TimelapseFrame, age_image, age_image_path, age_image_with_global_masks, age_timelapse,
    timelapse_ages,
};
