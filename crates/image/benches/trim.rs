//! Benchmarks for border trimming.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use pngtrim_image::{detect_format, encode_png, trim_image, visible_bounds, TrimOptions};

/// 512x512 transparent canvas with an opaque 256x256 square in the middle.
fn padded_canvas() -> DynamicImage {
    let mut img = RgbaImage::new(512, 512);
    for y in 128..384 {
        for x in 128..384 {
            img.put_pixel(x, y, Rgba([30, 120, 200, 255]));
        }
    }
    DynamicImage::ImageRgba8(img)
}

fn bench_format_detection(c: &mut Criterion) {
    let png_data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

    c.bench_function("detect_png", |b| {
        b.iter(|| detect_format(black_box(&png_data)))
    });
}

fn bench_trim(c: &mut Criterion) {
    let img = padded_canvas();
    let encoded = encode_png(&img).expect("encode benchmark input");
    let options = TrimOptions::default();

    c.bench_function("visible_bounds_512", |b| {
        b.iter(|| visible_bounds(black_box(&img)))
    });

    c.bench_function("trim_image_512", |b| {
        b.iter(|| trim_image(black_box(&encoded), &options))
    });
}

criterion_group!(benches, bench_format_detection, bench_trim);
criterion_main!(benches);
