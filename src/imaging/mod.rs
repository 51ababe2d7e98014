//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Pixel density** | custom parser (JFIF, EXIF/TIFF IFD, PNG `pHYs`) |
//! | **Resample** | `resize_exact`, Catmull-Rom bicubic by default |
//! | **Encode** | `image` encoders chosen by output extension |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for box-fit math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Resolution**: DPI read/write for the containers that carry it

pub mod backend;
mod calculations;
mod params;
pub mod resolution;
pub mod rust_backend;

pub use backend::{CodecError, Dimensions, ImageCodec, Raster};
pub use calculations::{ScaleResult, calculate_box_fit, calculate_scale_factor};
pub use params::{
    EncodeParams, InvalidTargetBox, Quality, ResampleFilter, Resolution, TargetBox,
};
pub use rust_backend::{DecodedImage, RustCodec};
