//! Error types for the image crate.

use crate::ImageFormat;
use pngtrim_core::{Error, ErrorCode};
use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Data does not start with any known image signature
    #[error("Unknown image format")]
    UnknownFormat,

    /// Recognized format this build cannot decode
    #[error("Unsupported image format: {0:?}")]
    Unsupported(ImageFormat),

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),

    /// Decoder rejected the data
    #[cfg(feature = "processing")]
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// PNG encoder failed
    #[cfg(feature = "processing")]
    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),
}

impl From<ImageError> for Error {
    fn from(err: ImageError) -> Self {
        let code = match &err {
            ImageError::UnknownFormat | ImageError::InvalidData(_) => ErrorCode::ImageDecode,
            ImageError::Unsupported(_) => ErrorCode::UnsupportedFormat,
            #[cfg(feature = "processing")]
            ImageError::Decode(_) => ErrorCode::ImageDecode,
            #[cfg(feature = "processing")]
            ImageError::Encode(_) => ErrorCode::ImageEncode,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}
