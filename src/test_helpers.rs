//! Shared test utilities for the boxfit test suite.
//!
//! Synthetic images are generated with the `image` encoders so tests never
//! depend on fixture files. Pixel values form a gradient, which keeps JPEG
//! output non-trivial without making files large.

use crate::imaging::Resolution;
use crate::imaging::resolution::insert_png_phys;
use image::codecs::jpeg::{JpegEncoder, PixelDensity, PixelDensityUnit};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::path::Path;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a JPEG of the given size, optionally with a JFIF density in DPI.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32, resolution: Option<Resolution>) {
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    let mut encoder = JpegEncoder::new(writer);
    if let Some(res) = resolution {
        let (x, y) = res.to_whole_dpi();
        encoder.set_pixel_density(PixelDensity {
            density: (x, y),
            unit: PixelDensityUnit::Inches,
        });
    }
    encoder
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a PNG of the given size, optionally with a `pHYs` density.
pub fn create_test_png(path: &Path, width: u32, height: u32, resolution: Option<Resolution>) {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    if let Some(res) = resolution {
        buf = insert_png_phys(&buf, res).unwrap();
    }
    std::fs::write(path, buf).unwrap();
}
