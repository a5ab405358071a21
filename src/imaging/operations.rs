//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take parameters, compute target dimensions, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend, MAX_WEBP_DIMENSION};
use super::calculations::fit_dimensions;
use super::params::OptimizeParams;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// What happened to one optimized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizedImage {
    pub original: Dimensions,
    pub output: Dimensions,
    pub bytes_written: u64,
}

/// Decode → fit → resize → (strip) → encode for a single file.
pub fn optimize_image(backend: &impl ImageBackend, params: &OptimizeParams) -> Result<OptimizedImage> {
    let decoded = backend.decode(&params.source)?;
    let original = decoded.dimensions();

    let (width, height) = fit_dimensions(
        (original.width, original.height),
        params.max_width,
        params.max_height,
    );
    // Reject before resizing: an upscaled strip can ask for a huge canvas
    if width > MAX_WEBP_DIMENSION || height > MAX_WEBP_DIMENSION {
        return Err(BackendError::Unsupported(format!(
            "target size {width}x{height} exceeds the WebP limit of {MAX_WEBP_DIMENSION}px per side"
        )));
    }
    let resized = backend.resize(decoded, width, height);

    let prepared = if params.strip_metadata {
        backend.strip_metadata(resized)
    } else {
        resized
    };

    let bytes_written = backend.encode(&prepared, &params.output, &params.encode)?;

    Ok(OptimizedImage {
        original,
        output: prepared.dimensions(),
        bytes_written,
    })
}
