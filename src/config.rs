//! CLI configuration module.
//!
//! Handles loading and validating `boxfit.toml`. The library API
//! never reads configuration; only the `boxfit` binary does, and command-line
//! flags override whatever the file says.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [target]
//! width = 1024              # Box width in pixels
//! height = 1024             # Box height in pixels
//!
//! [resample]
//! filter = "catmull-rom"    # nearest | triangle | catmull-rom | gaussian | lanczos3
//!
//! [output]
//! quality = 90              # JPEG quality (1-100)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [target]
//! width = 320
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ResampleFilter, TargetBox};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Resizer configuration loaded from `boxfit.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    /// The box images are fitted into.
    pub target: TargetConfig,
    /// Resampling settings.
    pub resample: ResampleConfig,
    /// Encoder settings.
    pub output: OutputConfig,
}

impl ResizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.width == 0 || self.target.height == 0 {
            return Err(ConfigError::Validation(
                "target.width and target.height must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// The configured box; a zero side is a validation error.
    pub fn target_box(&self) -> Result<TargetBox, ConfigError> {
        TargetBox::new(self.target.width, self.target.height)
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.quality)
    }
}

/// Bounding box dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

/// Resampling settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResampleConfig {
    pub filter: ResampleFilter,
}

/// Output encoding settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1 = worst, 100 = best). Lossless formats ignore it.
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
        }
    }
}

/// Load config from the file at `path`, falling back to stock defaults when
/// the file does not exist. Keys the file omits keep their defaults.
pub fn load_config(path: &Path) -> Result<ResizerConfig, ConfigError> {
    if !path.exists() {
        return Ok(ResizerConfig::default());
    }
    let config: ResizerConfig = toml::from_str(&fs::read_to_string(path)?)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `boxfit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# boxfit Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Target box
# ---------------------------------------------------------------------------
[target]
# The longer edge of the source is scaled to the matching box edge:
# landscape and square images take the box width, portrait images the
# box height. The other edge follows the aspect ratio and may exceed the
# box when the box is not square.
width = 1024
height = 1024

# ---------------------------------------------------------------------------
# Resampling
# ---------------------------------------------------------------------------
[resample]
# nearest | triangle | catmull-rom | gaussian | lanczos3
# catmull-rom is bicubic.
filter = "catmull-rom"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1 = worst, 100 = best). Lossless formats ignore it.
quality = 90
"##
}
