//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the [`resizer`](crate::resizer) (which decides what size to
//! produce) and the [`backend`](super::backend) (which does the actual pixel
//! work). This separation allows swapping codecs (e.g. for testing with a mock)
//! without changing the scaling policy.
//!
//! ## Types
//!
//! - [`TargetBox`] — The width × height envelope a resizer fits images into. Both sides positive.
//! - [`Resolution`] — Horizontal/vertical DPI carried from source to output.
//! - [`ResampleFilter`] — Interpolation filter used when resampling (bicubic by default).
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`EncodeParams`] — Everything the encoder needs besides the raster and path.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rejected target box dimensions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("target box must have positive dimensions, got {width}x{height}")]
pub struct InvalidTargetBox {
    pub width: u32,
    pub height: u32,
}

/// The bounding box a resizer scales images into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetBox {
    width: u32,
    height: u32,
}

impl TargetBox {
    pub fn new(width: u32, height: u32) -> Result<Self, InvalidTargetBox> {
        if width == 0 || height == 0 {
            return Err(InvalidTargetBox { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }
}

impl fmt::Display for TargetBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

const METERS_PER_INCH: f64 = 0.0254;

/// Pixel density in dots per inch.
///
/// Stored as floating point because most containers store density as a
/// rational or in dots per meter, neither of which maps to whole DPI values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Resolution {
    /// Returns `None` unless both values are finite and positive.
    pub fn new(horizontal: f64, vertical: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(horizontal) && valid(vertical)).then_some(Self {
            horizontal,
            vertical,
        })
    }

    pub fn from_dots_per_meter(x: u32, y: u32) -> Option<Self> {
        Self::new(
            f64::from(x) * METERS_PER_INCH,
            f64::from(y) * METERS_PER_INCH,
        )
    }

    pub fn from_dots_per_centimeter(x: f64, y: f64) -> Option<Self> {
        Self::new(x * 2.54, y * 2.54)
    }

    /// Density in dots per meter, rounded, as PNG `pHYs` stores it.
    pub fn to_dots_per_meter(self) -> (u32, u32) {
        let ppm = |dpi: f64| (dpi / METERS_PER_INCH).round() as u32;
        (ppm(self.horizontal), ppm(self.vertical))
    }

    /// Whole DPI clamped to `1..=u16::MAX`, as JFIF stores it.
    pub fn to_whole_dpi(self) -> (u16, u16) {
        let whole = |dpi: f64| dpi.round().clamp(1.0, f64::from(u16::MAX)) as u16;
        (whole(self.horizontal), whole(self.vertical))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} dpi", self.horizontal, self.vertical)
    }
}

/// Interpolation filter for resampling.
///
/// `CatmullRom` is the bicubic kernel and the default: it matches the
/// "high quality bicubic" mode photo tools use for downscaling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResampleFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Triangle => "triangle",
            Self::CatmullRom => "catmull-rom",
            Self::Gaussian => "gaussian",
            Self::Lanczos3 => "lanczos3",
        }
    }
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Encoder settings that are not part of the raster itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeParams {
    pub quality: Quality,
}
