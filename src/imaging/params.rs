//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`operations`](super::operations) module (which
//! decides what each output should look like) and the
//! [`backend`](super::backend) (which does the actual pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (0-100, default 85). Clamped on construction.
//! - [`EncodeParams`]: How to write the WebP file: quality and lossless flag.
//! - [`OptimizeParams`]: Everything needed for one file: source, output, limits, encoding.

use std::path::PathBuf;

/// Quality setting for lossy WebP encoding (0-100).
///
/// Only constructed through [`Quality::new`], so the value is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Encoder settings for a single output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeParams {
    pub quality: Quality,
    /// Write lossless WebP; `quality` is ignored.
    pub lossless: bool,
}

/// Everything needed to turn one source file into one optimized output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub strip_metadata: bool,
    pub encode: EncodeParams,
}
