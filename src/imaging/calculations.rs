//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate output dimensions that fit a source image into optional limits.
///
/// The aspect ratio is always preserved. Which limit binds depends on what is
/// given:
///
/// - **Both**: fit-within-box. Scale to `max_width` unless that would push the
///   height past `max_height`, in which case scale to `max_height` instead.
/// - **Width only**: width becomes `max_width`, height follows.
/// - **Height only**: height becomes `max_height`, width follows.
/// - **Neither**: the source dimensions are returned unchanged.
///
/// A limit of `0` counts as absent. Images smaller than the limits are scaled
/// up, not left alone. The proportional side is rounded to the nearest pixel
/// (halves round up) and never drops below 1.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `max_width` - Optional maximum width in pixels
/// * `max_height` - Optional maximum height in pixels
///
/// # Examples
/// ```
/// # use folder_optimizer::imaging::fit_dimensions;
/// // 1000x500 landscape into a 600px width → 600x300
/// assert_eq!(fit_dimensions((1000, 500), Some(600), None), (600, 300));
///
/// // Portrait into a 600x600 box: height binds → 200x600
/// assert_eq!(fit_dimensions((300, 900), Some(600), Some(600)), (200, 600));
/// ```
pub fn fit_dimensions(
    source: (u32, u32),
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return source;
    }

    let max_width = max_width.filter(|&w| w > 0);
    let max_height = max_height.filter(|&h| h > 0);

    match (max_width, max_height) {
        (Some(max_w), Some(max_h)) => {
            // Height that max_w would produce exceeds max_h ⇔ max_w * h > max_h * w
            if u64::from(max_w) * u64::from(src_h) > u64::from(max_h) * u64::from(src_w) {
                (scale(src_w, max_h, src_h), max_h)
            } else {
                (max_w, scale(src_h, max_w, src_w))
            }
        }
        (Some(max_w), None) => (max_w, scale(src_h, max_w, src_w)),
        (None, Some(max_h)) => (scale(src_w, max_h, src_h), max_h),
        (None, None) => source,
    }
}

/// `round(value * numerator / denominator)`, at least 1.
///
/// Integer arithmetic so results don't drift with float precision.
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let num = u64::from(value) * u64::from(numerator);
    let den = u64::from(denominator);
    let rounded = (2 * num + den) / (2 * den);
    rounded.clamp(1, u64::from(u32::MAX)) as u32
}
