//! Pure Rust codec backed by the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `ImageReader` with content sniffing |
//! | Pixel density | custom [`resolution`](super::resolution) reader |
//! | Resample | `DynamicImage::resize_exact` (Catmull-Rom bicubic by default) |
//! | Encode → JPEG | `JpegEncoder` with quality + JFIF density |
//! | Encode → PNG | `PngEncoder`, then a `pHYs` chunk spliced in |
//! | Encode → TIFF | `tiff::encoder::TiffEncoder` with resolution tags |
//! | Encode → BMP | `DynamicImage::write_to`, then pels-per-meter patched in |
//! | Encode → GIF, WebP | `DynamicImage::write_to` |
//!
//! Each encoder accepts only some pixel layouts, so the raster is converted
//! first (see [`encodable`]). GIF takes RGBA8 only; BMP and WebP take 8-bit
//! gray or color; TIFF has no gray+alpha layout.

use super::backend::{CodecError, Dimensions, ImageCodec, Raster};
use super::params::{EncodeParams, ResampleFilter, Resolution};
use super::resolution::{insert_png_phys, read_resolution, set_bmp_density};
use image::codecs::jpeg::{JpegEncoder, PixelDensity, PixelDensityUnit};
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{Rational, TiffEncoder, TiffValue};
use tiff::tags::ResolutionUnit;

/// Output formats with an encoder compiled in.
const OUTPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// Resolve the output format for `path` from its extension (case-insensitive).
pub fn output_format(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?;
    OUTPUT_CANDIDATES
        .iter()
        .find(|(candidate, fmt)| candidate.eq_ignore_ascii_case(ext) && fmt.writing_enabled())
        .map(|(_, fmt)| *fmt)
}

/// A decoded image plus the density read from its container.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub resolution: Option<Resolution>,
}

impl Raster for DecodedImage {
    fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    fn set_resolution(&mut self, resolution: Option<Resolution>) {
        self.resolution = resolution;
    }
}

/// Codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

// The resizer attaches the file path; codec messages carry only the cause.
fn decode_error(err: impl std::fmt::Display) -> CodecError {
    CodecError::Decode(err.to_string())
}

fn encode_error(err: impl std::fmt::Display) -> CodecError {
    CodecError::Encode(err.to_string())
}

/// Encode as JPEG. JPEG has no alpha channel, so the raster is flattened to RGB.
fn encode_jpeg(
    image: &DynamicImage,
    resolution: Option<Resolution>,
    quality: u8,
) -> image::ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    if let Some(res) = resolution {
        let (x, y) = res.to_whole_dpi();
        encoder.set_pixel_density(PixelDensity {
            density: (x, y),
            unit: PixelDensityUnit::Inches,
        });
    }
    DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
    Ok(buf)
}

/// Convert `image` to a pixel layout the encoder for `format` accepts.
///
/// Borrows when no conversion is needed. JPEG flattens in [`encode_jpeg`] and
/// TIFF picks its layout in [`encode_tiff`], so both pass through here as-is.
fn encodable(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    match (format, image) {
        (ImageFormat::Gif, DynamicImage::ImageRgba8(_)) => Cow::Borrowed(image),
        (ImageFormat::Gif, _) => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
        (
            ImageFormat::Bmp | ImageFormat::WebP,
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_),
        ) => Cow::Borrowed(image),
        (ImageFormat::Bmp | ImageFormat::WebP, _) if image.color().has_alpha() => {
            Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8()))
        }
        (ImageFormat::Bmp | ImageFormat::WebP, _) => {
            Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8()))
        }
        // PNG stores at most 16 bits per sample
        (ImageFormat::Png, DynamicImage::ImageRgb32F(_)) => {
            Cow::Owned(DynamicImage::ImageRgb16(image.to_rgb16()))
        }
        (ImageFormat::Png, DynamicImage::ImageRgba32F(_)) => {
            Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16()))
        }
        _ => Cow::Borrowed(image),
    }
}

fn encode_png(image: &DynamicImage, resolution: Option<Resolution>) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    image
        .write_with_encoder(PngEncoder::new(&mut buf))
        .map_err(encode_error)?;
    match resolution {
        Some(res) => insert_png_phys(&buf, res)
            .ok_or_else(|| encode_error("encoder produced malformed PNG")),
        None => Ok(buf),
    }
}

/// DPI as a TIFF rational with two decimal places.
fn dpi_rational(dpi: f64) -> Rational {
    Rational {
        n: (dpi * 100.0).round() as u32,
        d: 100,
    }
}

fn write_tiff_image<C, W>(
    encoder: &mut TiffEncoder<W>,
    width: u32,
    height: u32,
    data: &[C::Inner],
    resolution: Option<Resolution>,
) -> tiff::TiffResult<()>
where
    C: ColorType,
    W: Write + Seek,
    [C::Inner]: TiffValue,
{
    let mut image = encoder.new_image::<C>(width, height)?;
    if let Some(res) = resolution {
        image.resolution_unit(ResolutionUnit::Inch);
        image.x_resolution(dpi_rational(res.horizontal));
        image.y_resolution(dpi_rational(res.vertical));
    }
    image.write_data(data)
}

/// Encode as baseline TIFF, writing density as inches when present.
///
/// Gray, RGB and RGBA at 8 or 16 bits are written as-is. Gray+alpha has no
/// TIFF layout here and widens to RGBA; float rasters narrow to 16 bits.
fn encode_tiff(image: &DynamicImage, resolution: Option<Resolution>) -> tiff::TiffResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf)?;
        let (w, h) = (image.width(), image.height());
        match image {
            DynamicImage::ImageLuma8(img) => {
                write_tiff_image::<colortype::Gray8, _>(&mut encoder, w, h, img.as_raw(), resolution)?
            }
            DynamicImage::ImageLuma16(img) => {
                write_tiff_image::<colortype::Gray16, _>(&mut encoder, w, h, img.as_raw(), resolution)?
            }
            DynamicImage::ImageRgb8(img) => {
                write_tiff_image::<colortype::RGB8, _>(&mut encoder, w, h, img.as_raw(), resolution)?
            }
            DynamicImage::ImageRgb16(img) => {
                write_tiff_image::<colortype::RGB16, _>(&mut encoder, w, h, img.as_raw(), resolution)?
            }
            DynamicImage::ImageRgba8(img) => {
                write_tiff_image::<colortype::RGBA8, _>(&mut encoder, w, h, img.as_raw(), resolution)?
            }
            DynamicImage::ImageRgba16(img) => {
                write_tiff_image::<colortype::RGBA16, _>(&mut encoder, w, h, img.as_raw(), resolution)?
            }
            DynamicImage::ImageRgb32F(_) => {
                let img = image.to_rgb16();
                write_tiff_image::<colortype::RGB16, _>(&mut encoder, w, h, img.as_raw(), resolution)?
            }
            DynamicImage::ImageLumaA16(_) | DynamicImage::ImageRgba32F(_) => {
                let img = image.to_rgba16();
                write_tiff_image::<colortype::RGBA16, _>(&mut encoder, w, h, img.as_raw(), resolution)?
            }
            _ => {
                let img = image.to_rgba8();
                write_tiff_image::<colortype::RGBA8, _>(&mut encoder, w, h, img.as_raw(), resolution)?
            }
        }
    }
    Ok(buf.into_inner())
}

impl ImageCodec for RustCodec {
    type Raster = DecodedImage;

    fn identify(&self, path: &Path) -> Result<Dimensions, CodecError> {
        let (width, height) = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(decode_error)?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage, CodecError> {
        let bytes = std::fs::read(path)?;
        let image = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()?
            .decode()
            .map_err(decode_error)?;
        Ok(DecodedImage {
            image,
            resolution: read_resolution(&bytes),
        })
    }

    fn resample(
        &self,
        raster: &DecodedImage,
        size: Dimensions,
        filter: ResampleFilter,
    ) -> Result<DecodedImage, CodecError> {
        // resize_exact writes every destination pixel from the source alone,
        // so nothing of a previous destination is blended in
        let image = raster
            .image
            .resize_exact(size.width, size.height, filter.into());
        Ok(DecodedImage {
            image,
            resolution: None,
        })
    }

    fn encode(
        &self,
        raster: &DecodedImage,
        path: &Path,
        params: &EncodeParams,
    ) -> Result<(), CodecError> {
        let format = output_format(path)
            .ok_or_else(|| CodecError::UnsupportedFormat(path.display().to_string()))?;

        let bytes = match format {
            ImageFormat::Jpeg => encode_jpeg(
                &raster.image,
                raster.resolution,
                params.quality.value() as u8,
            )
            .map_err(encode_error)?,
            ImageFormat::Png => encode_png(&encodable(&raster.image, format), raster.resolution)?,
            ImageFormat::Tiff => encode_tiff(&raster.image, raster.resolution).map_err(encode_error)?,
            other => {
                let mut buf = Cursor::new(Vec::new());
                encodable(&raster.image, other)
                    .write_to(&mut buf, other)
                    .map_err(encode_error)?;
                let mut bytes = buf.into_inner();
                if let (ImageFormat::Bmp, Some(res)) = (other, raster.resolution) {
                    if !set_bmp_density(&mut bytes, res) {
                        return Err(encode_error("encoder produced malformed BMP"));
                    }
                }
                bytes
            }
        };

        // Encode fully in memory first so a codec failure never touches the file
        let mut writer = BufWriter::new(std::fs::File::create(path)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}
