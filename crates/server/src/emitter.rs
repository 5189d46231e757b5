//! Turns a [`ProcessingResult`] into an HTTP response.

use crate::packager::ProcessingResult;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use pngtrim_archive::ARCHIVE_MIME;
use pngtrim_image::ImageFormat;

/// RFC 5987 `attr-char` minus the alphanumerics.
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

impl IntoResponse for ProcessingResult {
    fn into_response(self) -> Response {
        match self {
            ProcessingResult::SingleFile { name, bytes } => {
                attachment(ImageFormat::Png.mime_type(), &name, bytes)
            }
            ProcessingResult::Bundle { file_name, archive } => {
                attachment(ARCHIVE_MIME, &file_name, archive)
            }
            ProcessingResult::InlineList { items } => Json(items).into_response(),
        }
    }
}

fn attachment(mime: &'static str, name: &str, body: Vec<u8>) -> Response {
    (
        [
            (CONTENT_TYPE, HeaderValue::from_static(mime)),
            (CONTENT_DISPOSITION, attachment_disposition(name)),
        ],
        body,
    )
        .into_response()
}

/// `Content-Disposition: attachment` header for `name`.
///
/// Plain ASCII names go in `filename` as is. Anything else also gets an
/// RFC 5987 `filename*`, with `filename` reduced to an ASCII stand-in.
pub fn attachment_disposition(name: &str) -> HeaderValue {
    let plain = name.chars().all(is_plain_char);

    let value = if plain {
        format!("attachment; filename=\"{}\"", name)
    } else {
        let fallback: String = name
            .chars()
            .map(|c| if is_plain_char(c) { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            utf8_percent_encode(name, FILENAME_ENCODE_SET)
        )
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn is_plain_char(c: char) -> bool {
    (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\'
}
