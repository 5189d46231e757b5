//! Header-only dimension probing.
//!
//! Reads width and height without decoding pixel data, which keeps request
//! logging cheap for large uploads.

use crate::{detect_format, ImageFormat};
use serde::{Deserialize, Serialize};

/// Basic facts about an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Encoded size in bytes
    pub size_bytes: usize,
}

/// Probe dimensions from the image header.
///
/// Returns `None` for formats without a header parser here, or when the
/// header is truncated.
pub fn probe_dimensions(data: &[u8]) -> Option<ImageInfo> {
    let format = detect_format(data).ok()?;

    let (width, height) = match format {
        ImageFormat::Png => png_dimensions(data)?,
        ImageFormat::Jpeg => jpeg_dimensions(data)?,
        ImageFormat::Gif => gif_dimensions(data)?,
        _ => return None,
    };

    Some(ImageInfo {
        width,
        height,
        format,
        size_bytes: data.len(),
    })
}

/// IHDR is always the first chunk: 8-byte signature, length, "IHDR", width, height.
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || &data[12..16] != b"IHDR" {
        return None;
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);

    Some((width, height))
}

fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    // Skip SOI marker
    let mut i = 2;

    while i + 4 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // SOF markers carry the frame size
        if matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF) {
            if i + 9 < data.len() {
                let height = u32::from(u16::from_be_bytes([data[i + 5], data[i + 6]]));
                let width = u32::from(u16::from_be_bytes([data[i + 7], data[i + 8]]));
                return Some((width, height));
            }
            return None;
        }

        if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
        } else {
            let length = usize::from(u16::from_be_bytes([data[i + 2], data[i + 3]]));
            i += 2 + length;
        }
    }

    None
}

/// Logical screen size sits right after the 6-byte signature.
fn gif_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 10 {
        return None;
    }

    let width = u32::from(u16::from_le_bytes([data[6], data[7]]));
    let height = u32::from(u16::from_le_bytes([data[8], data[9]]));

    Some((width, height))
}
