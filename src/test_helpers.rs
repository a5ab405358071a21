//! Shared test utilities: synthetic image fixtures.
//!
//! Images are generated on the fly with the `image` encoders so tests don't
//! depend on checked-in binary files.
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! create_test_jpeg(&tmp.path().join("wide.jpg"), 1000, 500);
//! write_corrupt_file(&tmp.path().join("broken.jpg"));
//! ```

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a small valid JPEG with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

/// Write a BMP with the given dimensions.
pub fn create_test_bmp(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Bmp)
        .unwrap();
}

/// Write an RGBA PNG whose alpha varies across the image.
pub fn create_test_png_rgba(path: &Path, width: u32, height: u32) {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, 64, (y % 256) as u8, ((x + y) % 256) as u8])
    })
    .save_with_format(path, ImageFormat::Png)
    .unwrap();
}

/// Write a lossless animated WebP with one solid frame per entry of
/// `delays_ms`, alternating red and blue.
pub fn create_test_animated_webp(path: &Path, width: u32, height: u32, delays_ms: &[i32]) {
    let frames: Vec<Vec<u8>> = (0..delays_ms.len())
        .map(|i| {
            let color: [u8; 4] = if i % 2 == 0 {
                [255, 0, 0, 255]
            } else {
                [0, 0, 255, 255]
            };
            color.repeat((width * height) as usize)
        })
        .collect();

    let mut config = webp::WebPConfig::new().unwrap();
    config.lossless = 1;
    let mut encoder = webp::AnimEncoder::new(width, height, &config);
    let mut timestamp = 0;
    for (pixels, delay) in frames.iter().zip(delays_ms) {
        encoder.add_frame(webp::AnimFrame::from_rgba(pixels, width, height, timestamp));
        timestamp += delay;
    }
    std::fs::write(path, &*encoder.try_encode().unwrap()).unwrap();
}

/// Write bytes that no decoder accepts.
pub fn write_corrupt_file(path: &Path) {
    std::fs::write(path, b"definitely not an image").unwrap();
}

/// Create an empty file (enough for scanning tests that use a mock backend).
pub fn touch(path: &Path) {
    std::fs::write(path, b"").unwrap();
}
