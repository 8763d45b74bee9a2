//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the enhancer needs:
//! `identify` (dimensions, alpha, format) and `preview` (downscale and
//! re-encode in the same format). Both work on in-memory bytes, since images
//! may come from disk, the network or `data:` URIs alike.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{ImageInfo, PreviewParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unrecognized image format")]
    UnknownFormat,
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Read dimensions, alpha and format without scaling.
    fn identify(&self, bytes: &[u8]) -> Result<ImageInfo, BackendError>;

    /// Produce a scaled copy encoded as `params.format`.
    fn preview(&self, bytes: &[u8], params: &PreviewParams) -> Result<Vec<u8>, BackendError>;
}
