//! End-to-end properties of the aging pipeline: untouched pixels outside the
//! crop, clamped outputs, reproducibility and the default tile layout.

use ageshift::{
    AgingParams, AgingTransform, BlendMasks, BoundingBox, BoxError, Error, FixedLocator,
    IdentityTransform, age_face, age_image, plan_crop, plan_tiles,
};
use ndarray::{Array3, ArrayView3, s};

fn test_params() -> AgingParams {
    AgingParams {
        source_age: 14.0,
        target_age: 50.0,
        input_size: 128,
        window_size: 64,
        stride: 32,
        parallel: false,
    }
}

/// Deterministic textured image in [0, 1].
fn textured_image(rows: usize, cols: usize) -> Array3<f32> {
    Array3::from_shape_fn((rows, cols, 3), |(y, x, c)| {
        let v = ((y * 13 + x * 7 + c * 29) % 251) as f32 / 250.0;
        v.clamp(0.0, 1.0)
    })
}

/// Emits wildly out-of-range values that depend on tile content.
struct Adversarial;

impl AgingTransform for Adversarial {
    fn apply(&self, tile: ArrayView3<'_, f32>) -> Result<Array3<f32>, BoxError> {
        Ok(tile
            .slice(s![.., .., ..3])
            .mapv(|v| if v > 0.5 { 40.0 * v } else { -25.0 - v }))
    }
}

/// A non-trivial but deterministic transform mixing the age channels in.
struct AgeTint;

impl AgingTransform for AgeTint {
    fn apply(&self, tile: ArrayView3<'_, f32>) -> Result<Array3<f32>, BoxError> {
        let (h, w, _) = tile.dim();
        Ok(Array3::from_shape_fn((h, w, 3), |(y, x, c)| {
            let delta = tile[[y, x, 4]] - tile[[y, x, 3]];
            (tile[[y, x, c]] * 0.3 + delta * 0.2).sin() * 0.1
        }))
    }
}

#[test]
fn pixels_outside_crop_are_bit_identical() {
    let image = textured_image(300, 260);
    let face = BoundingBox::new(100, 170, 180, 90);
    let params = test_params();
    let masks = BlendMasks::synthetic(params.input_size, params.window_size);

    let crop = plan_crop(300, 260, &face).unwrap();
    let out = age_face(image.view(), &face, &Adversarial, &masks, &params).unwrap();

    assert_eq!(out.dim(), image.dim());
    for ((y, x, c), &v) in out.indexed_iter() {
        if !crop.contains(y, x) {
            assert_eq!(v.to_bits(), image[[y, x, c]].to_bits(), "pixel {},{},{}", y, x, c);
        }
    }
}

#[test]
fn outputs_stay_in_range_for_adversarial_transform() {
    let image = textured_image(200, 200);
    let face = BoundingBox::new(60, 140, 140, 60);
    let params = test_params();
    let masks = BlendMasks::uniform(params.input_size, params.window_size);

    let out = age_face(image.view(), &face, &Adversarial, &masks, &params).unwrap();
    assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
    // The blended region was actually modified.
    let crop = plan_crop(200, 200, &face).unwrap();
    let cy = (crop.ly + crop.ry) / 2;
    let cx = (crop.lx + crop.rx) / 2;
    assert_ne!(out[[cy, cx, 0]], image[[cy, cx, 0]]);
}

#[test]
fn replay_is_bit_identical() {
    let image = textured_image(240, 320);
    let locator = FixedLocator::single(BoundingBox::new(70, 200, 150, 120));
    let params = test_params();
    let masks = BlendMasks::synthetic(params.input_size, params.window_size);

    let first = age_image(image.view(), &locator, &AgeTint, &masks, &params).unwrap();
    let second = age_image(image.view(), &locator, &AgeTint, &masks, &params).unwrap();
    assert_eq!(first, second);

    let parallel = AgingParams {
        parallel: true,
        ..params.clone()
    };
    let third = age_image(image.view(), &locator, &AgeTint, &masks, &parallel).unwrap();
    assert_eq!(first, third);
}

#[test]
fn no_face_aborts_request() {
    let image = textured_image(64, 64);
    let params = test_params();
    let masks = BlendMasks::synthetic(params.input_size, params.window_size);
    let result = age_image(
        image.view(),
        &FixedLocator::new(Vec::new()),
        &IdentityTransform,
        &masks,
        &params,
    );
    assert!(matches!(result, Err(Error::NoFaceDetected)));
}

#[test]
fn failing_transform_returns_no_image() {
    struct Broken;
    impl AgingTransform for Broken {
        fn apply(&self, _: ArrayView3<'_, f32>) -> Result<Array3<f32>, BoxError> {
            Err("accelerator unavailable".into())
        }
    }

    let image = textured_image(200, 200);
    let face = BoundingBox::new(60, 140, 140, 60);
    let params = test_params();
    let masks = BlendMasks::synthetic(params.input_size, params.window_size);
    let err = age_face(image.view(), &face, &Broken, &masks, &params).unwrap_err();
    assert!(matches!(err, Error::TransformFailure { y: 0, x: 0, .. }));
}

#[test]
fn default_layout_scans_three_by_three_tiles() {
    let params = AgingParams::default();
    let tiles = plan_tiles(
        params.input_size,
        params.input_size,
        params.window_size,
        params.stride,
    )
    .unwrap();
    assert_eq!(tiles.len(), 9);
    let mut ys: Vec<usize> = tiles.iter().map(|t| t.y).collect();
    ys.dedup();
    assert_eq!(ys, vec![0, 256, 512]);
}

#[test]
fn reference_face_box_gives_square_crop() {
    let face = BoundingBox::new(100, 350, 300, 150);
    for (h, w) in [(1000, 800), (800, 1000)] {
        let crop = plan_crop(h, w, &face).unwrap();
        assert_eq!(crop.height(), crop.width());
        assert!(crop.ry <= h && crop.rx <= w);
        assert!(crop.height() > 0);
    }
}

#[test]
fn identity_transform_with_flat_masks_leaves_flat_region_doubled() {
    // Additive compositing: with unit masks and an identity transform the
    // crop receives its own (resized) pixels on top of the original.
    let image = Array3::from_elem((160, 160, 3), 0.2f32);
    let face = BoundingBox::new(50, 110, 110, 50);
    let params = test_params();
    let masks = BlendMasks::uniform(params.input_size, params.window_size);
    let out = age_face(image.view(), &face, &IdentityTransform, &masks, &params).unwrap();
    let crop = plan_crop(160, 160, &face).unwrap();
    let inner = out.slice(s![crop.ly..crop.ry, crop.lx..crop.rx, ..]);
    assert!(inner.iter().all(|&v| (v - 0.4).abs() < 1e-4));
}
