//! Pure dimension calculations for recompression
//!
//! All functions here are pure and testable without any I/O or images.

/// Scales `(width, height)` down uniformly so both edges fit within `max_dimension`
///
/// The scale factor is the smaller of the two per-axis ratios, so the aspect
/// ratio is preserved. Images already within the bound are returned unchanged;
/// this never enlarges.
///
/// # Examples
///
/// ```
/// use wiki_mirror::images::fit_within;
///
/// // 2000x500 landscape, bound 1000 -> 1000x250
/// assert_eq!(fit_within(2000, 500, 1000), (1000, 250));
///
/// // Already small enough
/// assert_eq!(fit_within(640, 480, 1000), (640, 480));
/// ```
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }

    let scale = f64::min(
        max_dimension as f64 / width as f64,
        max_dimension as f64 / height as f64,
    );

    let scaled = |edge: u32| ((edge as f64 * scale).round() as u32).clamp(1, max_dimension);
    (scaled(width), scaled(height))
}

/// Returns true if an image of this size has to be scaled down
pub fn needs_resize(width: u32, height: u32, max_dimension: u32) -> bool {
    width > max_dimension || height > max_dimension
}
