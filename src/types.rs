//! Shared types used across the aging pipeline.
//! Includes the detector's `BoundingBox`, the planned `CropRectangle`,
//! tile origins (`TilePlacement`) and the writer-side `OutputFormat`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Face box in source pixel coordinates, ordered like common face detectors
/// report it: (top, right, bottom, left).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
    pub left: i64,
}

impl BoundingBox {
    pub fn new(top: i64, right: i64, bottom: i64, left: i64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    pub fn width(&self) -> i64 {
        self.right - self.left
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "top={} right={} bottom={} left={}",
            self.top, self.right, self.bottom, self.left
        )
    }
}

impl std::str::FromStr for BoundingBox {
    type Err = String;

    /// Parses `top,right,bottom,left`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!(
                "expected 4 comma-separated integers (top,right,bottom,left), got '{s}'"
            ));
        }
        let mut v = [0i64; 4];
        for (slot, part) in v.iter_mut().zip(&parts) {
            *slot = part
                .parse::<i64>()
                .map_err(|e| format!("invalid coordinate '{part}': {e}"))?;
        }
        Ok(BoundingBox::new(v[0], v[1], v[2], v[3]))
    }
}

/// Half-open crop region `[ly, ry) x [lx, rx)` in source pixel coordinates.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CropRectangle {
    pub ly: usize,
    pub ry: usize,
    pub lx: usize,
    pub rx: usize,
}

impl CropRectangle {
    pub fn height(&self) -> usize {
        self.ry - self.ly
    }

    pub fn width(&self) -> usize {
        self.rx - self.lx
    }

    pub fn contains(&self, y: usize, x: usize) -> bool {
        (self.ly..self.ry).contains(&y) && (self.lx..self.rx).contains(&x)
    }
}

impl std::fmt::Display for CropRectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "y={}..{} x={}..{} ({}x{})",
            self.ly,
            self.ry,
            self.lx,
            self.rx,
            self.width(),
            self.height()
        )
    }
}

/// Origin of one tile on the working canvas.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct TilePlacement {
    pub y: usize,
    pub x: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum OutputFormat {
    JPEG, // Lossy, preview only
    PNG,
}

impl OutputFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::JPEG),
            "png" => Some(OutputFormat::PNG),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::JPEG => write!(f, "JPEG"),
            OutputFormat::PNG => write!(f, "PNG"),
        }
    }
}
