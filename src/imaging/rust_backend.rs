//! Production image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, BMP) | `image` crate (pure Rust decoders) |
//! | Animated WebP frames | `image::codecs::webp::WebPDecoder` via `AnimationDecoder` |
//! | ICC / EXIF extraction | `image::ImageDecoder::{icc_profile, exif_metadata}` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → WebP | `webp` crate (libwebp), lossy or lossless |
//! | Encode → animated WebP | `webp::AnimEncoder` |
//! | Metadata embedding | [`webp_container`](super::webp_container) |

use super::backend::{
    AnimationFrame, BackendError, DecodedImage, EmbeddedMetadata, ImageBackend,
    MAX_WEBP_DIMENSION,
};
use super::params::EncodeParams;
use super::webp_container;
use image::codecs::webp::WebPDecoder;
use image::imageops::{self, FilterType};
use image::{AnimationDecoder, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Backend built on the `image` crate for decoding and libwebp for encoding.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Load and decode an image from disk, keeping its ICC profile and EXIF block.
///
/// The format is sniffed from the file contents, so a PNG saved as `.jpg`
/// still decodes. Animated WebP sources keep every frame.
fn load_image(path: &Path) -> Result<DecodedImage, BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;

    if reader.format() == Some(ImageFormat::WebP) {
        let decoder = WebPDecoder::new(BufReader::new(File::open(path)?))
            .map_err(|e| decode_error(path, e))?;
        if decoder.has_animation() {
            return load_animation(path, decoder);
        }
    }

    let mut decoder = reader.into_decoder().map_err(|e| decode_error(path, e))?;
    let metadata = read_metadata(path, &mut decoder)?;
    let pixels = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;

    Ok(DecodedImage::still(pixels, metadata))
}

fn load_animation(
    path: &Path,
    mut decoder: WebPDecoder<BufReader<File>>,
) -> Result<DecodedImage, BackendError> {
    let metadata = read_metadata(path, &mut decoder)?;
    let frames: Vec<AnimationFrame> = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| decode_error(path, e))?
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            AnimationFrame {
                delay_ms: numer.checked_div(denom).unwrap_or(0),
                pixels: frame.into_buffer(),
            }
        })
        .collect();

    let first = frames
        .first()
        .ok_or_else(|| decode_error(path, "animation has no frames"))?;

    Ok(DecodedImage {
        pixels: DynamicImage::ImageRgba8(first.pixels.clone()),
        frames,
        metadata,
    })
}

fn read_metadata<D: ImageDecoder + ?Sized>(
    path: &Path,
    decoder: &mut D,
) -> Result<EmbeddedMetadata, BackendError> {
    let icc_profile = decoder.icc_profile().map_err(|e| decode_error(path, e))?;
    let exif = decoder
        .exif_metadata()
        .map_err(|e| decode_error(path, e))?
        .map(|raw| {
            if raw.starts_with(b"Exif\0\0") {
                raw[6..].to_vec()
            } else {
                raw
            }
        });
    Ok(EmbeddedMetadata { icc_profile, exif })
}

fn check_canvas(width: u32, height: u32) -> Result<(), BackendError> {
    if width == 0 || height == 0 {
        return Err(BackendError::Unsupported("image has no pixels".into()));
    }
    if width > MAX_WEBP_DIMENSION || height > MAX_WEBP_DIMENSION {
        return Err(BackendError::Unsupported(format!(
            "{width}x{height} exceeds the WebP limit of {MAX_WEBP_DIMENSION}px per side"
        )));
    }
    Ok(())
}

/// Run libwebp over the pixels. Alpha is kept only when the source has it.
fn encode_webp(img: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
    let (width, height) = (img.width(), img.height());
    check_canvas(width, height)?;

    let quality = params.quality.value() as f32;
    let result = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height)
            .encode_simple(params.lossless, quality)
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height)
            .encode_simple(params.lossless, quality)
    };
    let memory = result.map_err(|e| BackendError::Encode(format!("{e:?}")))?;

    Ok(memory.to_vec())
}

/// Encode all frames into one animated WebP, keeping each frame's delay.
fn encode_animation(
    frames: &[AnimationFrame],
    width: u32,
    height: u32,
    params: &EncodeParams,
) -> Result<Vec<u8>, BackendError> {
    check_canvas(width, height)?;

    let mut config = webp::WebPConfig::new()
        .map_err(|()| BackendError::Encode("cannot initialize libwebp config".into()))?;
    config.lossless = i32::from(params.lossless);
    config.quality = params.quality.value() as f32;

    let mut encoder = webp::AnimEncoder::new(width, height, &config);
    // Frame start times must strictly increase
    let mut timestamp: i32 = 0;
    for frame in frames {
        encoder.add_frame(webp::AnimFrame::from_rgba(
            frame.pixels.as_raw(),
            width,
            height,
            timestamp,
        ));
        let delay = i32::try_from(frame.delay_ms.max(1)).unwrap_or(i32::MAX);
        timestamp = timestamp.saturating_add(delay);
    }
    let memory = encoder
        .try_encode()
        .map_err(|e| BackendError::Encode(format!("{e:?}")))?;

    Ok(memory.to_vec())
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DecodedImage, BackendError> {
        load_image(path)
    }

    fn resize(&self, image: DecodedImage, width: u32, height: u32) -> DecodedImage {
        if image.pixels.width() == width && image.pixels.height() == height {
            return image;
        }
        let frames = image
            .frames
            .into_iter()
            .map(|frame| AnimationFrame {
                pixels: imageops::resize(&frame.pixels, width, height, FilterType::Lanczos3),
                delay_ms: frame.delay_ms,
            })
            .collect();
        DecodedImage {
            pixels: image.pixels.resize_exact(width, height, FilterType::Lanczos3),
            frames,
            metadata: image.metadata,
        }
    }

    fn strip_metadata(&self, image: DecodedImage) -> DecodedImage {
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
        let (width, height) = (image.pixels.width(), image.pixels.height());
        let encoded = if image.is_animated() {
            encode_animation(&image.frames, width, height, params)?
        } else {
            encode_webp(&image.pixels, params)?
        };
        let bytes = webp_container::embed_metadata(&encoded, &image.metadata, width, height)?;
        std::fs::write(path, &bytes)?;
        Ok(bytes.len() as u64)
    }
}
