//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: decode, resize, strip_metadata, and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): `image` crate decoders
//! with Lanczos3 resampling, and libwebp (via the `webp` crate) for encoding.

use super::params::EncodeParams;
use image::{DynamicImage, RgbaImage};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("WebP encode failed: {0}")]
    Encode(String),
    #[error("Unsupported image: {0}")]
    Unsupported(String),
}

/// WebP's hard limit on either side.
pub const MAX_WEBP_DIMENSION: u32 = 16383;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Metadata blocks carried alongside the pixels.
///
/// Both are stored raw: `icc_profile` is the ICC blob, `exif` is the TIFF-structured
/// EXIF payload (no `Exif\0\0` prefix). Anything else the source had (XMP, IPTC,
/// PNG text chunks) is dropped on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedMetadata {
    pub icc_profile: Option<Vec<u8>>,
    pub exif: Option<Vec<u8>>,
}

impl EmbeddedMetadata {
    pub fn is_empty(&self) -> bool {
        self.icc_profile.is_none() && self.exif.is_none()
    }
}

/// One full-canvas frame of an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub pixels: RgbaImage,
    /// How long the frame is shown, in milliseconds.
    pub delay_ms: u32,
}

/// A decoded image and the metadata it came with.
///
/// For animated sources `frames` holds every frame and `pixels` is the first
/// one; for still images `frames` is empty.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixels: DynamicImage,
    pub frames: Vec<AnimationFrame>,
    pub metadata: EmbeddedMetadata,
}

impl DecodedImage {
    pub fn still(pixels: DynamicImage, metadata: EmbeddedMetadata) -> Self {
        Self {
            pixels,
            frames: Vec::new(),
            metadata,
        }
    }

    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }
}

/// Trait for image processing backends.
///
/// Every backend must implement all four operations so the batch driver is
/// backend-agnostic and can be tested with a mock.
pub trait ImageBackend {
    /// Decode an image file into pixels plus embedded metadata.
    fn decode(&self, path: &Path) -> Result<DecodedImage, BackendError>;

    /// Resample every frame to exactly `width` x `height`. Metadata is carried over.
    fn resize(&self, image: DecodedImage, width: u32, height: u32) -> DecodedImage;

    /// Drop all embedded metadata, leaving the pixels untouched.
    fn strip_metadata(&self, image: DecodedImage) -> DecodedImage;

    /// Encode as WebP and write to `path`. Returns the number of bytes written.
    fn encode(
        &self,
        image: &DecodedImage,
        path: &Path,
        params: &EncodeParams,
    ) -> Result<u64, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Mock backend that records operations without touching any codec.
    ///
    /// Decoding returns a blank image of the registered size for the file name
    /// (falling back to `default_dimensions`); names in `fail_decode` error out.
    /// Encoding records the call and writes nothing, unless the output name is
    /// in `fail_encode`.
    #[derive(Default)]
    pub struct MockBackend {
        pub dimensions: Mutex<Vec<(String, Dimensions)>>,
        pub default_dimensions: Option<Dimensions>,
        pub fail_decode: HashSet<String>,
        pub fail_encode: HashSet<String>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(String),
        Resize {
            width: u32,
            height: u32,
        },
        StripMetadata,
        Encode {
            output: String,
            width: u32,
            height: u32,
            quality: u32,
            lossless: bool,
            has_metadata: bool,
        },
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_default_dimensions(width: u32, height: u32) -> Self {
            Self {
                default_dimensions: Some(Dimensions { width, height }),
                ..Self::default()
            }
        }

        pub fn with_image(self, name: &str, width: u32, height: u32) -> Self {
            self.dimensions
                .lock()
                .unwrap()
                .push((name.to_string(), Dimensions { width, height }));
            self
        }

        pub fn failing_on(mut self, name: &str) -> Self {
            self.fail_decode.insert(name.to_string());
            self
        }

        /// Fail the write of the output file called `name`.
        pub fn failing_encode_on(mut self, name: &str) -> Self {
            self.fail_encode.insert(name.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn encoded_outputs(&self) -> Vec<String> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Encode { output, .. } => Some(output),
                    _ => None,
                })
                .collect()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, path: &Path) -> Result<DecodedImage, BackendError> {
            let name = file_name(path);
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(name.clone()));

            if self.fail_decode.contains(&name) {
                return Err(BackendError::Decode {
                    path: path.display().to_string(),
                    message: "mock decode failure".to_string(),
                });
            }

            let dims = self
                .dimensions
                .lock()
                .unwrap()
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, d)| *d)
                .or(self.default_dimensions)
                .ok_or_else(|| BackendError::Unsupported(format!("no mock image for {name}")))?;

            Ok(DecodedImage::still(
                DynamicImage::new_rgb8(dims.width, dims.height),
                EmbeddedMetadata {
                    icc_profile: None,
                    exif: Some(b"MM\0*mock".to_vec()),
                },
            ))
        }

        fn resize(&self, image: DecodedImage, width: u32, height: u32) -> DecodedImage {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Resize { width, height });
            DecodedImage::still(DynamicImage::new_rgb8(width, height), image.metadata)
        }

        fn strip_metadata(&self, image: DecodedImage) -> DecodedImage {
            self.operations.lock().unwrap().push(RecordedOp::StripMetadata);
            DecodedImage {
                metadata: EmbeddedMetadata::default(),
                ..image
            }
        }

        fn encode(
            &self,
            image: &DecodedImage,
            path: &Path,
            params: &EncodeParams,
        ) -> Result<u64, BackendError> {
            let output = file_name(path);
            if self.fail_encode.contains(&output) {
                return Err(BackendError::Io(std::io::Error::other("mock write failure")));
            }
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                output,
                width: image.pixels.width(),
                height: image.pixels.height(),
                quality: params.quality.value(),
                lossless: params.lossless,
                has_metadata: !image.metadata.is_empty(),
            });
            Ok(0)
        }
    }

    #[test]
    fn mock_decodes_registered_dimensions() {
        let backend = MockBackend::new().with_image("a.jpg", 800, 600);

        let decoded = backend.decode(Path::new("/test/a.jpg")).unwrap();
        assert_eq!(
            decoded.dimensions(),
            Dimensions {
                width: 800,
                height: 600
            }
        );

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Decode("a.jpg".to_string())]);
    }

    #[test]
    fn mock_fails_on_request() {
        let backend = MockBackend::with_default_dimensions(10, 10).failing_on("bad.png");
        assert!(backend.decode(Path::new("/test/bad.png")).is_err());
        assert!(backend.decode(Path::new("/test/good.png")).is_ok());
    }

    #[test]
    fn mock_fails_encode_on_request() {
        let backend = MockBackend::with_default_dimensions(10, 10).failing_encode_on("bad.webp");
        let image = backend.decode(Path::new("/test/bad.png")).unwrap();
        let params = EncodeParams::default();

        assert!(backend.encode(&image, Path::new("/out/bad.webp"), &params).is_err());
        assert!(backend.encode(&image, Path::new("/out/good.webp"), &params).is_ok());
        assert_eq!(backend.encoded_outputs(), vec!["good.webp"]);
    }

    #[test]
    fn mock_strip_clears_metadata_only() {
        let backend = MockBackend::with_default_dimensions(40, 30);
        let decoded = backend.decode(Path::new("x.jpg")).unwrap();
        assert!(!decoded.metadata.is_empty());

        let stripped = backend.strip_metadata(decoded);
        assert!(stripped.metadata.is_empty());
        assert_eq!(stripped.pixels.width(), 40);
        assert_eq!(stripped.pixels.height(), 30);
    }
}
