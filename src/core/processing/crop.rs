use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{BoundingBox, CropRectangle};

/// Overall margin scale applied around the detected face box.
const MARGIN_SCALE: f64 = 0.85;
/// Share of the vertical margin placed above the box (forehead is often cut off).
const TOP_SHARE: f64 = 0.63;
/// Share of the vertical margin placed below the box.
const BOTTOM_SHARE: f64 = 0.37;

/// Floating-point floor division derived from the remainder, so that exact
/// multiples of an inexact divisor round down consistently
/// (`floor_div(200.0, 2.0 / 0.85) == 84.0` whereas `(200.0 / (2.0 / 0.85)).floor() == 85.0`).
pub fn floor_div(a: f64, b: f64) -> f64 {
    let rem = a % b;
    let mut div = (a - rem) / b;
    if rem != 0.0 && ((b < 0.0) != (rem < 0.0)) {
        div -= 1.0;
    }
    if div == 0.0 {
        return 0.0_f64.copysign(a / b);
    }
    let mut floored = div.floor();
    if div - floored > 0.5 {
        floored += 1.0;
    }
    floored
}

/// Margins (top, bottom, horizontal) added around a face box.
pub fn face_margins(face: &BoundingBox) -> (i64, i64, i64) {
    let bh = face.height() as f64;
    let bw = face.width() as f64;

    let mut margin_top = (bh * TOP_SHARE * MARGIN_SCALE) as i64;
    let margin_bottom = (bh * BOTTOM_SHARE * MARGIN_SCALE) as i64;
    let margin_x = floor_div(bw, 2.0 / MARGIN_SCALE) as i64;
    // Square the rectangle: total vertical margin equals total horizontal margin.
    margin_top += 2 * margin_x - margin_top - margin_bottom;

    (margin_top, margin_bottom, margin_x)
}

fn validate_face(height: usize, width: usize, face: &BoundingBox) -> Result<()> {
    if face.top >= face.bottom || face.left >= face.right {
        return Err(Error::geometry(format!("empty face box ({face})")));
    }
    if face.top < 0 || face.left < 0 || face.bottom > height as i64 || face.right > width as i64 {
        return Err(Error::geometry(format!(
            "face box ({face}) lies outside the {width}x{height} image"
        )));
    }
    Ok(())
}

/// Place the span `[lo, hi)` inside `[0, limit)`, sliding it back when it
/// overflows one side and truncating only when it is longer than `limit`.
fn fit_span(lo: i64, hi: i64, limit: usize) -> (usize, usize) {
    let limit = limit as i64;
    let len = hi - lo;
    let (lo, hi) = if len >= limit {
        (0, limit)
    } else if lo < 0 {
        (0, len)
    } else if hi > limit {
        (limit - len, limit)
    } else {
        (lo, hi)
    };
    (lo as usize, hi as usize)
}

/// Widen `[lo, hi)` symmetrically to `side`.
fn grow_span(lo: i64, hi: i64, side: i64) -> (i64, i64) {
    let start = lo - (side - (hi - lo)) / 2;
    (start, start + side)
}

/// Cut `[lo, hi)` down to `side`, centred on the face span `[face_lo, face_hi)`
/// and kept inside the original span.
fn shrink_span(lo: usize, hi: usize, side: usize, face_lo: i64, face_hi: i64) -> (usize, usize) {
    let centre = (face_lo + face_hi) / 2;
    let start = (centre - side as i64 / 2).clamp(lo as i64, (hi - side) as i64) as usize;
    (start, start + side)
}

/// Plan the square crop around `face` for an image of `height` x `width` pixels.
pub fn plan_crop(height: usize, width: usize, face: &BoundingBox) -> Result<CropRectangle> {
    if height == 0 || width == 0 {
        return Err(Error::geometry(format!("empty image {width}x{height}")));
    }
    validate_face(height, width, face)?;

    let (margin_top, margin_bottom, margin_x) = face_margins(face);
    debug!(
        "Face margins: top={}, bottom={}, horizontal={}",
        margin_top, margin_bottom, margin_x
    );

    // Tall boxes get a negative top margin; the crop still covers the box.
    let raw_ly = (face.top - margin_top).min(face.top);
    let raw_ry = (face.bottom + margin_bottom).max(face.bottom);
    let raw_lx = (face.left - margin_x).min(face.left);
    let raw_rx = (face.right + margin_x).max(face.right);

    let side = (raw_ry - raw_ly).max(raw_rx - raw_lx);
    let (raw_ly, raw_ry) = grow_span(raw_ly, raw_ry, side);
    let (raw_lx, raw_rx) = grow_span(raw_lx, raw_rx, side);

    let (ly, ry) = fit_span(raw_ly, raw_ry, height);
    let (lx, rx) = fit_span(raw_lx, raw_rx, width);

    // Only an image narrower than the squared crop forces a cut.
    let side = (ry - ly).min(rx - lx);
    let (ly, ry) = shrink_span(ly, ry, side, face.top, face.bottom);
    let (lx, rx) = shrink_span(lx, rx, side, face.left, face.right);

    let rect = CropRectangle { ly, ry, lx, rx };
    debug!("Planned crop: {}", rect);
    Ok(rect)
}
