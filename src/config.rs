//! Job configuration.
//!
//! A [`JobConfig`] is built once per run from three layers, later ones winning:
//!
//! 1. Stock defaults ([`JobConfig::default`])
//! 2. An optional TOML file passed with `--config`
//! 3. Command-line flags
//!
//! Nothing is ever written back; the config lives only as long as the run.
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//! quality = 85            # WebP quality (0-100)
//! # max_width = 600       # Maximum output width in pixels (omit for none)
//! # max_height = 600      # Maximum output height in pixels (omit for none)
//! strip_metadata = true   # Drop EXIF and ICC data from the output
//! lossless = false        # Lossless WebP (ignores quality)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{EncodeParams, OptimizeParams, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
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

/// Whether the input path is one folder of images or a parent of such folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Single,
    Multi,
}

/// Settings shared by every image in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    /// WebP encoding quality (0 = smallest, 100 = best).
    pub quality: u32,
    /// Maximum output width; `None` or `0` means unconstrained.
    pub max_width: Option<u32>,
    /// Maximum output height; `None` or `0` means unconstrained.
    pub max_height: Option<u32>,
    /// Drop embedded metadata (EXIF, ICC profile) from the output.
    pub strip_metadata: bool,
    /// Encode lossless WebP instead of lossy.
    pub lossless: bool,
    /// Chosen by the invocation, not the config file.
    #[serde(skip)]
    pub mode: Mode,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            max_width: None,
            max_height: None,
            strip_metadata: true,
            lossless: false,
            mode: Mode::Single,
        }
    }
}

impl JobConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quality > 100 {
            return Err(ConfigError::Validation("quality must be 0-100".into()));
        }
        Ok(())
    }

    pub fn encode_params(&self) -> EncodeParams {
        EncodeParams {
            quality: Quality::new(self.quality),
            lossless: self.lossless,
        }
    }

    /// Parameters for turning `source` into `output` under this config.
    pub fn optimize_params(&self, source: PathBuf, output: PathBuf) -> OptimizeParams {
        OptimizeParams {
            source,
            output,
            max_width: self.max_width.filter(|&w| w > 0),
            max_height: self.max_height.filter(|&h| h > 0),
            strip_metadata: self.strip_metadata,
            encode: self.encode_params(),
        }
    }
}

/// Load and validate a config file. Keys not present keep their defaults.
pub fn load_config(path: &Path) -> Result<JobConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: JobConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// A documented config file with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r##"# Folder Optimizer Configuration
# ==============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# WebP encoding quality (0 = smallest file, 100 = best quality).
quality = 85

# Maximum output size in pixels. Aspect ratio is always preserved.
# With only max_width, every image is scaled to exactly that width.
# With both, images are fitted inside the max_width x max_height box.
# max_width = 600
# max_height = 600

# Drop EXIF and ICC profile data from the output files.
strip_metadata = true

# Write lossless WebP. Quality is ignored when this is on.
lossless = false
"##
}
