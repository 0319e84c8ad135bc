//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Covers the request-fatal conditions of the aging pipeline (no face, degenerate
//! geometry, failing tiles) as well as I/O, image codec, and resize failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error type returned by the pluggable collaborators (transform, locator).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No face detected in input image")]
    NoFaceDetected,

    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("Transform failed on tile at y={y}, x={x}: {reason}")]
    TransformFailure { y: usize, x: usize, reason: String },

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Region locator error: {0}")]
    Locator(String),

    #[error("Blend masks are already installed")]
    MasksAlreadyInstalled,

    #[error("Blend masks have not been installed")]
    MasksNotInstalled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Resize error: {0}")]
    Resize(String),

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }

    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        Error::InvalidGeometry {
            reason: reason.into(),
        }
    }
}
