//! Pure Rust image backend on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format sniffing | `ImageReader::with_guessed_format` |
//! | Identify | `ImageDecoder::dimensions` + `color_type` (no pixel decode) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | `DynamicImage::write_to` in the source format |

use super::backend::{BackendError, ImageBackend};
use super::params::{ImageInfo, PreviewParams};
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;

/// Backend using the `image` crate's pure Rust codecs.
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

fn reader(bytes: &[u8]) -> Result<(ImageReader<Cursor<&[u8]>>, ImageFormat), BackendError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format().ok_or(BackendError::UnknownFormat)?;
    Ok((reader, format))
}

fn decode(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), BackendError> {
    let (reader, format) = reader(bytes)?;
    let img = reader
        .decode()
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode: {}", e)))?;
    Ok((img, format))
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<ImageInfo, BackendError> {
        let (reader, format) = reader(bytes)?;
        let decoder = reader
            .into_decoder()
            .map_err(|e| BackendError::ProcessingFailed(format!("Failed to read header: {}", e)))?;
        let (width, height) = decoder.dimensions();
        Ok(ImageInfo {
            width,
            height,
            has_alpha: decoder.color_type().has_alpha(),
            format,
        })
    }

    fn preview(&self, bytes: &[u8], params: &PreviewParams) -> Result<Vec<u8>, BackendError> {
        let (img, _) = decode(bytes)?;
        let scaled = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        // JPEG has no alpha channel to encode.
        let scaled = match params.format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(scaled.to_rgb8()),
            _ => scaled,
        };

        let mut out = Cursor::new(Vec::new());
        scaled.write_to(&mut out, params.format).map_err(|e| {
            BackendError::ProcessingFailed(format!("{:?} encode failed: {}", params.format, e))
        })?;
        Ok(out.into_inner())
    }
}
