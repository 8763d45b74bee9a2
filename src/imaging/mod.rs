//! Image handling for the media enhancer, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image` decoder header: dimensions, alpha, format |
//! | **Preview** | Lanczos3 downscale, re-encoded in the source format |
//!
//! The module is split into:
//! - **Calculations**: pure dimension math (unit testable)
//! - **Parameters**: data describing an image and a preview
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{preview_dimensions, wants_preview};
pub use params::{ImageInfo, PreviewParams};
pub use rust_backend::RustBackend;
