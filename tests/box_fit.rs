//! End-to-end resizes through the public API with real image files.
//!
//! Sources are generated on the fly with the `image` encoders; outputs are
//! checked by decoding them again.

use boxfit::imaging::Resolution;
use boxfit::imaging::resolution::{insert_png_phys, read_resolution};
use boxfit::{BoxFitResizer, ResizeError, ResizeOutcome};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{
    DynamicImage, ExtendedColorType, GrayAlphaImage, GrayImage, ImageBuffer, ImageEncoder,
    ImageFormat, Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage,
};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 64]))
}

fn write_jpeg(path: &Path, width: u32, height: u32, dpi: Option<u16>) {
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = JpegEncoder::new(std::io::BufWriter::new(file));
    if let Some(dpi) = dpi {
        encoder.set_pixel_density(PixelDensity::dpi(dpi));
    }
    encoder
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

fn write_png(path: &Path, img: &RgbImage) {
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

fn dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

fn resolution_of(path: &Path) -> Option<Resolution> {
    read_resolution(&std::fs::read(path).unwrap())
}

#[test]
fn landscape_jpeg_takes_box_width() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("wide.jpg");
    let dest = tmp.path().join("wide-small.jpg");
    write_jpeg(&source, 200, 100, None);

    let outcome = BoxFitResizer::new(100, 100)
        .unwrap()
        .resize(&source, &dest)
        .unwrap();

    assert!(outcome.succeeded());
    assert_eq!(dimensions(&dest), (100, 50));
}

#[test]
fn portrait_png_takes_box_height() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("tall.png");
    let dest = tmp.path().join("tall-small.png");
    write_png(&source, &gradient(100, 200));

    BoxFitResizer::new(100, 100)
        .unwrap()
        .resize(&source, &dest)
        .unwrap();

    assert_eq!(dimensions(&dest), (50, 100));
}

#[test]
fn square_source_in_wide_box_overflows_height() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("square.png");
    let dest = tmp.path().join("square-big.png");
    write_png(&source, &gradient(100, 100));

    let outcome = BoxFitResizer::new(200, 50)
        .unwrap()
        .resize(&source, &dest)
        .unwrap();

    let ResizeOutcome::Resized(fit) = outcome else {
        panic!("expected a resize, got {outcome:?}");
    };
    assert_eq!(fit.factor, 2.0);
    assert_eq!(dimensions(&dest), (200, 200));
}

#[test]
fn solid_color_survives_resampling() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("red.png");
    let dest = tmp.path().join("red-small.png");
    write_png(&source, &RgbImage::from_pixel(64, 32, Rgb([200, 10, 10])));

    BoxFitResizer::new(32, 32)
        .unwrap()
        .resize(&source, &dest)
        .unwrap();

    let out = image::open(&dest).unwrap().to_rgb8();
    assert_eq!(out.dimensions(), (32, 16));
    assert!(out.pixels().all(|p| *p == Rgb([200, 10, 10])));
}

#[test]
fn output_format_follows_destination_extension() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.jpg");
    let dest = tmp.path().join("photo.png");
    write_jpeg(&source, 80, 60, None);

    BoxFitResizer::new(40, 40)
        .unwrap()
        .resize(&source, &dest)
        .unwrap();

    let bytes = std::fs::read(&dest).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    assert_eq!(dimensions(&dest), (40, 30));
}

#[test]
fn jpeg_density_carries_over() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("print.jpg");
    let dest = tmp.path().join("print-small.jpg");
    write_jpeg(&source, 120, 80, Some(300));

    BoxFitResizer::new(60, 60)
        .unwrap()
        .resize(&source, &dest)
        .unwrap();

    let res = resolution_of(&dest).unwrap();
    assert_eq!((res.horizontal, res.vertical), (300.0, 300.0));
}

#[test]
fn jpeg_density_carries_over_into_png() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("print.jpg");
    let dest = tmp.path().join("print-small.png");
    write_jpeg(&source, 120, 80, Some(240));

    BoxFitResizer::new(60, 60)
        .unwrap()
        .resize(&source, &dest)
        .unwrap();

    let res = resolution_of(&dest).unwrap();
    assert!((res.horizontal - 240.0).abs() < 0.01);
    assert!((res.vertical - 240.0).abs() < 0.01);
}

#[test]
fn no_density_in_means_no_density_out() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("plain.png");
    let dest = tmp.path().join("plain-small.png");
    write_png(&source, &gradient(50, 50));

    BoxFitResizer::new(25, 25)
        .unwrap()
        .resize(&source, &dest)
        .unwrap();

    assert_eq!(resolution_of(&dest), None);
}

#[test]
fn missing_source_removes_stale_destination() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("out.jpg");
    std::fs::write(&dest, b"left over from a previous run").unwrap();

    let outcome = BoxFitResizer::new(100, 100)
        .unwrap()
        .resize(tmp.path().join("nope.jpg"), &dest)
        .unwrap();

    assert_eq!(outcome, ResizeOutcome::SourceMissing);
    assert!(!outcome.succeeded());
    assert!(!dest.exists());
}

#[test]
fn empty_source_path_is_invalid_argument() {
    let tmp = TempDir::new().unwrap();
    let result = BoxFitResizer::new(100, 100)
        .unwrap()
        .resize("", tmp.path().join("out.jpg"));

    assert!(matches!(result, Err(ResizeError::InvalidArgument(_))));
}

#[test]
fn zero_box_is_invalid_argument() {
    assert!(matches!(
        BoxFitResizer::new(0, 0),
        Err(ResizeError::InvalidArgument(_))
    ));
}

#[test]
fn undecodable_source_is_decode_error() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("broken.jpg");
    let dest = tmp.path().join("out.jpg");
    std::fs::write(&source, b"\xFF\xD8 definitely not a jpeg body").unwrap();

    let err = BoxFitResizer::new(100, 100)
        .unwrap()
        .resize(&source, &dest)
        .unwrap_err();

    assert!(matches!(&err, ResizeError::Decode { path, .. } if *path == source));
    assert!(!dest.exists());
}

#[test]
fn unknown_destination_extension_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.png");
    let dest = tmp.path().join("photo.heic");
    write_png(&source, &gradient(20, 20));

    let err = BoxFitResizer::new(10, 10)
        .unwrap()
        .resize(&source, &dest)
        .unwrap_err();

    assert!(matches!(err, ResizeError::UnsupportedFormat { .. }));
    assert!(!dest.exists());
}

#[test]
fn unwritable_destination_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.png");
    write_png(&source, &gradient(20, 20));

    let err = BoxFitResizer::new(10, 10)
        .unwrap()
        .resize(&source, tmp.path().join("missing-dir/out.png"))
        .unwrap_err();

    assert!(matches!(err, ResizeError::Io { .. }));
}

#[test]
fn resizing_twice_is_stable() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.png");
    let first = tmp.path().join("first.png");
    let second = tmp.path().join("second.png");
    write_png(&source, &gradient(400, 300));

    let resizer = BoxFitResizer::new(200, 200).unwrap();
    resizer.resize(&source, &first).unwrap();
    resizer.resize(&first, &second).unwrap();

    assert_eq!(dimensions(&first), (200, 150));
    assert_eq!(dimensions(&second), (200, 150));
}

#[test]
fn plan_matches_resize() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.jpg");
    let dest = tmp.path().join("out.jpg");
    write_jpeg(&source, 300, 120, None);

    let resizer = BoxFitResizer::new(150, 150).unwrap();
    let plan = resizer.plan(&source).unwrap().unwrap();
    assert!(!dest.exists());
    resizer.resize(&source, &dest).unwrap();

    assert_eq!(dimensions(&dest), (plan.width, plan.height));
    assert_eq!((plan.width, plan.height), (150, 60));
}

/// Sources in the pixel layouts decoders commonly hand back.
fn layout_sources() -> Vec<(&'static str, DynamicImage)> {
    vec![
        (
            "l8",
            DynamicImage::ImageLuma8(GrayImage::from_fn(40, 20, |x, _| Luma([(x * 6) as u8]))),
        ),
        (
            "la8",
            DynamicImage::ImageLumaA8(GrayAlphaImage::from_fn(40, 20, |x, y| {
                LumaA([(x * 6) as u8, (y * 12) as u8])
            })),
        ),
        (
            "rgb16",
            DynamicImage::ImageRgb16(ImageBuffer::from_fn(40, 20, |x, y| {
                Rgb([(x * 1500) as u16, (y * 3000) as u16, 40_000])
            })),
        ),
        (
            "rgba8",
            DynamicImage::ImageRgba8(RgbaImage::from_fn(40, 20, |x, y| {
                Rgba([(x * 6) as u8, (y * 12) as u8, 90, 200])
            })),
        ),
    ]
}

/// Write `image` as a PNG carrying `dpi` in a pHYs chunk.
fn write_png_with_density(path: &Path, image: &DynamicImage, dpi: f64) {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    let res = Resolution::new(dpi, dpi).unwrap();
    std::fs::write(path, insert_png_phys(&png, res).unwrap()).unwrap();
}

#[test]
fn every_layout_encodes_to_every_output_format() {
    // (extension, output carries density)
    let outputs = [
        ("jpg", true),
        ("png", true),
        ("gif", false),
        ("bmp", true),
        ("tif", true),
        ("webp", false),
    ];
    let tmp = TempDir::new().unwrap();
    let resizer = BoxFitResizer::new(20, 20).unwrap();

    for (layout, image) in layout_sources() {
        let source = tmp.path().join(format!("{layout}.png"));
        write_png_with_density(&source, &image, 300.0);

        for (ext, carries_density) in outputs {
            let dest = tmp.path().join(format!("{layout}-out.{ext}"));
            let outcome = resizer.resize(&source, &dest);
            assert!(
                matches!(outcome, Ok(ResizeOutcome::Resized(_))),
                "{layout} -> {ext}: {outcome:?}"
            );
            assert_eq!(dimensions(&dest), (20, 10), "{layout} -> {ext}");

            let res = resolution_of(&dest);
            if carries_density {
                let res = res.unwrap_or_else(|| panic!("{layout} -> {ext}: density lost"));
                assert!(
                    (res.horizontal - 300.0).abs() < 0.01 && (res.vertical - 300.0).abs() < 0.01,
                    "{layout} -> {ext}: {res}"
                );
            } else {
                assert_eq!(res, None, "{layout} -> {ext}");
            }
        }
    }
}

#[test]
fn jpeg_density_carries_over_into_tiff_and_bmp() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("print.jpg");
    write_jpeg(&source, 120, 80, Some(300));
    let resizer = BoxFitResizer::new(60, 60).unwrap();

    for name in ["print-small.tif", "print-small.bmp"] {
        let dest = tmp.path().join(name);
        resizer.resize(&source, &dest).unwrap();

        assert_eq!(dimensions(&dest), (60, 40), "{name}");
        let res = resolution_of(&dest).unwrap_or_else(|| panic!("{name}: density lost"));
        assert!((res.horizontal - 300.0).abs() < 0.01, "{name}: {res}");
    }
}
