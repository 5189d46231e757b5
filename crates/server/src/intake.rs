//! Multipart upload intake.

use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::Multipart;
use axum::http::StatusCode;
use pngtrim_core::naming::sanitize_upload_name;
use pngtrim_core::{Error, Result};
use tracing::debug;

/// Form field carrying the images; may repeat.
pub const UPLOAD_FIELD: &str = "images";

/// One uploaded file, buffered in memory.
#[derive(Debug, Clone)]
pub struct UploadedItem {
    /// Sanitized client filename
    pub name: String,
    /// Raw file contents
    pub bytes: Bytes,
}

/// Read every `images` part in submission order.
///
/// Fails with [`ErrorCode::EmptyUpload`](pngtrim_core::ErrorCode::EmptyUpload)
/// when no part carries a file. An untouched browser file input sends a part
/// with an empty filename and no content; those are skipped.
pub async fn intake(mut multipart: Multipart, body_limit: usize) -> Result<Vec<UploadedItem>> {
    let mut items = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, body_limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!(field = ?field.name(), "Ignoring unrelated form field");
            continue;
        }

        let declared = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&e, body_limit))?;

        if bytes.is_empty() && declared.as_deref().is_none_or(str::is_empty) {
            debug!("Skipping empty file part");
            continue;
        }

        items.push(UploadedItem {
            name: sanitize_upload_name(declared.as_deref()),
            bytes,
        });
    }

    if items.is_empty() {
        return Err(Error::empty_upload());
    }

    debug!(count = items.len(), "Upload received");
    Ok(items)
}

/// Map a failure while reading parts.
pub fn multipart_error(err: &MultipartError, body_limit: usize) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::payload_too_large(body_limit)
    } else {
        Error::invalid_upload(format!("Malformed multipart body: {}", err.body_text()))
    }
}

/// Map a request that is not multipart at all.
pub fn rejection_error(rejection: &MultipartRejection) -> Error {
    Error::invalid_upload(format!("Expected a multipart upload: {}", rejection.body_text()))
        .with_suggestion("Send the files as multipart/form-data in the `images` field")
}
