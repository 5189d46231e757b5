//! Transparent border trimming.
//!
//! A pixel counts as visible when its alpha is non-zero. The output is the
//! smallest rectangle containing every visible pixel, re-encoded as PNG.
//! Images without an alpha channel have no transparent border and come
//! back at their original size.

use crate::error::{ImageError, Result};
use crate::detect_format;
use image::{DynamicImage, GenericImageView, ImageOutputFormat, RgbaImage};
use pngtrim_core::config::EmptyImagePolicy;
use std::io::Cursor;

/// Crop rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Options for border trimming
#[derive(Debug, Clone, Default)]
pub struct TrimOptions {
    /// Handling of images with no visible pixels
    pub empty_image: EmptyImagePolicy,
}

/// Turns encoded image bytes into trimmed PNG bytes.
///
/// The request pipeline only sees this trait, so alternative
/// implementations (and test doubles) can be swapped in.
pub trait Trimmer: Send + Sync {
    /// Trim one encoded image.
    fn trim(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// [`Trimmer`] backed by the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct BorderTrimmer {
    options: TrimOptions,
}

impl BorderTrimmer {
    /// Create a trimmer with the given options.
    pub fn new(options: TrimOptions) -> Self {
        Self { options }
    }
}

impl Trimmer for BorderTrimmer {
    fn trim(&self, data: &[u8]) -> Result<Vec<u8>> {
        trim_image(data, &self.options)
    }
}

/// Decode, trim and re-encode an image.
pub fn trim_image(data: &[u8], options: &TrimOptions) -> Result<Vec<u8>> {
    let format = detect_format(data)?;
    if !format.is_decodable() {
        return Err(ImageError::Unsupported(format));
    }

    let img = image::load_from_memory(data).map_err(ImageError::Decode)?;
    encode_png(&trim_dynamic(img, options))
}

/// Crop a decoded image to its visible bounds.
pub fn trim_dynamic(img: DynamicImage, options: &TrimOptions) -> DynamicImage {
    match visible_bounds(&img) {
        Some(bounds) if bounds.width == img.width() && bounds.height == img.height() => img,
        Some(bounds) => img.crop_imm(bounds.x, bounds.y, bounds.width, bounds.height),
        None => match options.empty_image {
            EmptyImagePolicy::Passthrough => img,
            EmptyImagePolicy::SinglePixel => DynamicImage::ImageRgba8(RgbaImage::new(1, 1)),
        },
    }
}

/// Smallest rectangle containing every pixel with non-zero alpha.
///
/// Returns `None` when no pixel is visible (including zero-sized images).
pub fn visible_bounds(img: &DynamicImage) -> Option<Bounds> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    if !img.color().has_alpha() {
        return Some(Bounds { x: 0, y: 0, width, height });
    }

    // 16-bit keeps every non-zero 8-bit alpha non-zero and preserves 16-bit sources
    let rgba = img.to_rgba16();

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in rgba.enumerate_pixels() {
        if pixel[3] != 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| Bounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Encode a DynamicImage as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    // PNG has no float sample type
    let converted;
    let img = match img {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            converted = DynamicImage::ImageRgba16(img.to_rgba16());
            &converted
        }
        _ => img,
    };

    img.write_to(&mut buffer, ImageOutputFormat::Png)
        .map_err(ImageError::Encode)?;
    Ok(buffer.into_inner())
}

/// Trim many images in parallel, preserving input order.
///
/// `on_done` runs once per image as it finishes, in completion order.
#[cfg(feature = "parallel")]
pub fn trim_all<F>(inputs: &[Vec<u8>], options: &TrimOptions, on_done: F) -> Vec<Result<Vec<u8>>>
where
    F: Fn() + Sync,
{
    use rayon::prelude::*;

    inputs
        .par_iter()
        .map(|data| {
            let result = trim_image(data, options);
            on_done();
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage, Rgba};

    const OPAQUE: Rgba<u8> = Rgba([200, 40, 90, 255]);

    /// Transparent canvas with an opaque square at (`offset`, `offset`).
    fn bordered(canvas: u32, offset: u32, size: u32) -> RgbaImage {
        let mut img = RgbaImage::new(canvas, canvas);
        for y in offset..offset + size {
            for x in offset..offset + size {
                img.put_pixel(x, y, OPAQUE);
            }
        }
        img
    }

    fn png_bytes(img: DynamicImage) -> Vec<u8> {
        encode_png(&img).unwrap()
    }

    fn decode(data: &[u8]) -> DynamicImage {
        image::load_from_memory(data).unwrap()
    }

    #[test]
    fn test_trims_ten_pixel_border() {
        let input = png_bytes(DynamicImage::ImageRgba8(bordered(40, 10, 20)));
        let output = trim_image(&input, &TrimOptions::default()).unwrap();

        let trimmed = decode(&output);
        assert_eq!(trimmed.dimensions(), (20, 20));
        assert!(trimmed.to_rgba8().pixels().all(|p| *p == OPAQUE));
    }

    #[test]
    fn test_no_border_is_pixel_identical() {
        let mut img = RgbaImage::new(8, 6);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 30) as u8, (y * 40) as u8, 7, 255]);
        }
        let input = png_bytes(DynamicImage::ImageRgba8(img.clone()));

        let output = trim_image(&input, &TrimOptions::default()).unwrap();
        assert_eq!(decode(&output).to_rgba8(), img);
    }

    #[test]
    fn test_interior_transparency_is_kept() {
        let mut img = bordered(12, 0, 12);
        img.put_pixel(5, 5, Rgba([0, 0, 0, 0]));

        let output = trim_image(&png_bytes(DynamicImage::ImageRgba8(img)), &TrimOptions::default())
            .unwrap();
        let trimmed = decode(&output).to_rgba8();
        assert_eq!(trimmed.dimensions(), (12, 12));
        assert_eq!(trimmed.get_pixel(5, 5)[3], 0);
    }

    #[test]
    fn test_asymmetric_bounds() {
        let mut img = RgbaImage::new(10, 10);
        img.put_pixel(3, 7, OPAQUE);
        img.put_pixel(6, 2, OPAQUE);

        let bounds = visible_bounds(&DynamicImage::ImageRgba8(img)).unwrap();
        assert_eq!(
            bounds,
            Bounds {
                x: 3,
                y: 2,
                width: 4,
                height: 6
            }
        );
    }

    #[test]
    fn test_faint_alpha_counts_as_visible() {
        let mut img = RgbaImage::new(5, 5);
        img.put_pixel(4, 4, Rgba([0, 0, 0, 1]));

        let bounds = visible_bounds(&DynamicImage::ImageRgba8(img)).unwrap();
        assert_eq!((bounds.x, bounds.y, bounds.width, bounds.height), (4, 4, 1, 1));
    }

    #[test]
    fn test_sixteen_bit_alpha() {
        let mut img: ImageBuffer<Rgba<u16>, Vec<u16>> = ImageBuffer::new(6, 6);
        img.put_pixel(1, 2, Rgba([0, 0, 0, 1]));

        let bounds = visible_bounds(&DynamicImage::ImageRgba16(img)).unwrap();
        assert_eq!((bounds.x, bounds.y), (1, 2));
    }

    #[test]
    fn test_rgb_image_is_unchanged() {
        let img: RgbImage = ImageBuffer::from_pixel(7, 3, Rgb([1, 2, 3]));
        let input = png_bytes(DynamicImage::ImageRgb8(img));

        let output = trim_image(&input, &TrimOptions::default()).unwrap();
        assert_eq!(decode(&output).dimensions(), (7, 3));
    }

    #[test]
    fn test_fully_transparent_passthrough() {
        let input = png_bytes(DynamicImage::ImageRgba8(RgbaImage::new(9, 4)));

        let output = trim_image(&input, &TrimOptions::default()).unwrap();
        assert!(!output.is_empty());
        assert_eq!(decode(&output).dimensions(), (9, 4));
    }

    #[test]
    fn test_fully_transparent_single_pixel() {
        let input = png_bytes(DynamicImage::ImageRgba8(RgbaImage::new(9, 4)));
        let options = TrimOptions {
            empty_image: EmptyImagePolicy::SinglePixel,
        };

        let output = trim_image(&input, &options).unwrap();
        let trimmed = decode(&output).to_rgba8();
        assert_eq!(trimmed.dimensions(), (1, 1));
        assert_eq!(trimmed.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_output_is_png() {
        let input = png_bytes(DynamicImage::ImageRgba8(bordered(4, 1, 2)));
        let output = BorderTrimmer::default().trim(&input).unwrap();
        assert_eq!(detect_format(&output).unwrap(), crate::ImageFormat::Png);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = trim_image(b"definitely not an image", &TrimOptions::default()).unwrap_err();
        assert!(matches!(err, ImageError::UnknownFormat));
    }

    #[test]
    fn test_truncated_png_fails_to_decode() {
        let input = png_bytes(DynamicImage::ImageRgba8(bordered(40, 10, 20)));
        let err = trim_image(&input[..input.len() / 2], &TrimOptions::default()).unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }

    #[test]
    fn test_undecodable_format_is_unsupported() {
        let err = trim_image(b"\x00\x00\x00\x1cftypavif\x00\x00", &TrimOptions::default())
            .unwrap_err();
        assert!(matches!(err, ImageError::Unsupported(crate::ImageFormat::Avif)));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_trim_all_preserves_order() {
        let inputs = vec![
            png_bytes(DynamicImage::ImageRgba8(bordered(30, 5, 10))),
            b"junk".to_vec(),
            png_bytes(DynamicImage::ImageRgba8(bordered(30, 5, 3))),
        ];

        let done = std::sync::atomic::AtomicUsize::new(0);
        let results = trim_all(&inputs, &TrimOptions::default(), || {
            done.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        });
        assert_eq!(done.into_inner(), 3);
        assert_eq!(decode(results[0].as_ref().unwrap()).dimensions(), (10, 10));
        assert!(results[1].is_err());
        assert_eq!(decode(results[2].as_ref().unwrap()).dimensions(), (3, 3));
    }
}
