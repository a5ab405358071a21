//! Image processing: decode, fit, resize, re-encode as WebP.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` crate (JPEG, PNG, WebP, BMP) |
//! | **Fit** | [`fit_dimensions`] (pure arithmetic) |
//! | **Resize** | Lanczos3 via `image::DynamicImage::resize_exact` |
//! | **Encode** | libwebp via the `webp` crate, optional ICC/EXIF chunks |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;
mod webp_container;

pub use backend::{
    AnimationFrame, BackendError, DecodedImage, Dimensions, EmbeddedMetadata, ImageBackend,
    MAX_WEBP_DIMENSION,
};
pub use calculations::fit_dimensions;
pub use operations::{OptimizedImage, optimize_image};
pub use params::{EncodeParams, OptimizeParams, Quality};
pub use rust_backend::RustBackend;
