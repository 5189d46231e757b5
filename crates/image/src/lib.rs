//! Image handling for pngtrim.
//!
//! This crate provides:
//! - Format detection from magic bytes
//! - Header-only dimension probing
//! - Transparent border trimming with PNG re-encoding

#![warn(missing_docs)]

mod detect;
mod error;
mod metadata;

#[cfg(feature = "processing")]
mod trim;

pub use detect::{detect_format, ImageFormat};
pub use error::{ImageError, Result};
pub use metadata::{probe_dimensions, ImageInfo};

#[cfg(feature = "processing")]
pub use trim::{
    encode_png, trim_dynamic, trim_image, visible_bounds, BorderTrimmer, Bounds, TrimOptions,
    Trimmer,
};

#[cfg(all(feature = "processing", feature = "parallel"))]
pub use trim::trim_all;
