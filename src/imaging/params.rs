//! Parameter types for image operations.
//!
//! These describe *what* to produce; the [`backend`](super::backend) decides
//! how. Keeping them apart lets the enhancer be tested against a mock
//! backend without decoding anything.

use image::ImageFormat;

/// What [`identify`](super::ImageBackend::identify) learns about an image
/// without scaling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    pub format: ImageFormat,
}

impl ImageInfo {
    /// MIME type of the detected format, e.g. `image/png`.
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Parameters for a preview: the image scaled down to `width`×`height` and
/// re-encoded in `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewParams {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl PreviewParams {
    /// Preview of `info` shrunk by `factor` on both axes.
    pub fn shrink(info: &ImageInfo, factor: u8) -> Self {
        let (width, height) = super::calculations::preview_dimensions(info.width, info.height, factor);
        Self {
            width,
            height,
            format: info.format,
        }
    }
}
