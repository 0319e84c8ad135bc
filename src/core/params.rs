use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default model input resolution (square).
pub const DEFAULT_INPUT_SIZE: usize = 1024;
/// Default transform tile size.
pub const DEFAULT_WINDOW_SIZE: usize = 512;
/// Default tile stride.
pub const DEFAULT_STRIDE: usize = 256;

/// Aging parameters suitable for config files and presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingParams {
    /// Approximate current age of the subject, in years
    pub source_age: f32,
    /// Desired age, in years
    pub target_age: f32,
    /// Side of the square working canvas the crop is resized to
    pub input_size: usize,
    /// Side of the square tile fed to the transform
    pub window_size: usize,
    /// Step between neighbouring tiles
    pub stride: usize,
    /// Run tile transforms of a row concurrently (needs the `parallel` feature)
    pub parallel: bool,
}

impl Default for AgingParams {
    fn default() -> Self {
        Self {
            source_age: 20.0,
            target_age: 70.0,
            input_size: DEFAULT_INPUT_SIZE,
            window_size: DEFAULT_WINDOW_SIZE,
            stride: DEFAULT_STRIDE,
            parallel: true,
        }
    }
}

impl AgingParams {
    pub fn with_ages(source_age: f32, target_age: f32) -> Self {
        Self {
            source_age,
            target_age,
            ..Self::default()
        }
    }

    /// Value broadcast into the source-age channel of the working canvas.
    pub fn source_age_channel(&self) -> f32 {
        self.source_age / 100.0
    }

    /// Value broadcast into the target-age channel of the working canvas.
    pub fn target_age_channel(&self) -> f32 {
        self.target_age / 100.0
    }

    pub fn validate(&self) -> Result<()> {
        if !self.source_age.is_finite() || self.source_age < 0.0 {
            return Err(Error::InvalidArgument {
                arg: "source_age",
                value: self.source_age.to_string(),
            });
        }
        if !self.target_age.is_finite() || self.target_age < 0.0 {
            return Err(Error::InvalidArgument {
                arg: "target_age",
                value: self.target_age.to_string(),
            });
        }
        if self.input_size == 0 {
            return Err(Error::InvalidArgument {
                arg: "input_size",
                value: self.input_size.to_string(),
            });
        }
        if self.window_size == 0 || self.window_size > self.input_size {
            return Err(Error::InvalidArgument {
                arg: "window_size",
                value: format!("{} (input_size {})", self.window_size, self.input_size),
            });
        }
        if self.stride == 0 || self.stride > self.window_size {
            return Err(Error::InvalidArgument {
                arg: "stride",
                value: format!("{} (window_size {})", self.stride, self.window_size),
            });
        }
        Ok(())
    }

    /// Load parameters from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: AgingParams = serde_json::from_str(&text).map_err(Error::external)?;
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let p = AgingParams::default();
        assert!(p.validate().is_ok());
        assert_eq!(p.input_size, 1024);
        assert_eq!(p.window_size, 512);
        assert_eq!(p.stride, 256);
    }

    #[test]
    fn age_channels_are_scaled_by_one_hundred() {
        let p = AgingParams::with_ages(45.0, 70.0);
        assert!((p.source_age_channel() - 0.45).abs() < 1e-6);
        assert!((p.target_age_channel() - 0.70).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_geometry() {
        let mut p = AgingParams::default();
        p.stride = 0;
        assert!(matches!(p.validate(), Err(Error::InvalidArgument { arg: "stride", .. })));

        let mut p = AgingParams::default();
        p.stride = 600;
        assert!(p.validate().is_err());

        let mut p = AgingParams::default();
        p.window_size = 2048;
        assert!(matches!(p.validate(), Err(Error::InvalidArgument { arg: "window_size", .. })));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let p: AgingParams = serde_json::from_str(r#"{"target_age": 50}"#).unwrap();
        assert_eq!(p.target_age, 50.0);
        assert_eq!(p.source_age, 20.0);
        assert_eq!(p.window_size, DEFAULT_WINDOW_SIZE);
    }
}
