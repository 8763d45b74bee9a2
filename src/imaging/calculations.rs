//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Dimensions of a preview shrunk by `factor`, never below 1×1.
///
/// A factor of 0 or 1 leaves the dimensions unchanged.
///
/// # Examples
/// ```
/// # use mdma::imaging::preview_dimensions;
/// assert_eq!(preview_dimensions(800, 600, 8), (100, 75));
/// assert_eq!(preview_dimensions(10, 3, 8), (1, 1));
/// ```
pub fn preview_dimensions(width: u32, height: u32, factor: u8) -> (u32, u32) {
    let factor = u32::from(factor.max(1));
    ((width / factor).max(1), (height / factor).max(1))
}

/// Whether a preview is worth producing at this factor.
pub fn wants_preview(factor: u8) -> bool {
    factor > 1
}
