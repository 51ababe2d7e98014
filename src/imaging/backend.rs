//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait defines the operations a resize needs from an
//! imaging library: identify, decode, resample, and encode. The box-fit policy
//! in [`resizer`](crate::resizer) only ever talks to this trait.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec), built on the `image` crate.

use super::params::{EncodeParams, ResampleFilter, Resolution};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("No encoder for output format: {0}")]
    UnsupportedFormat(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A decoded image held in memory.
///
/// Rasters own their pixel buffers; dropping one releases it.
pub trait Raster {
    fn dimensions(&self) -> Dimensions;

    fn resolution(&self) -> Option<Resolution>;

    fn set_resolution(&mut self, resolution: Option<Resolution>);
}

/// Trait for image codecs.
///
/// `Sync` so a single resizer can be shared by threads working on distinct files.
pub trait ImageCodec: Sync {
    type Raster: Raster;

    /// Read image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimensions, CodecError>;

    /// Decode an image file, including its pixel density when present.
    fn decode(&self, path: &Path) -> Result<Self::Raster, CodecError>;

    /// Resample the whole of `raster` into a new raster of exactly `size`.
    fn resample(
        &self,
        raster: &Self::Raster,
        size: Dimensions,
        filter: ResampleFilter,
    ) -> Result<Self::Raster, CodecError>;

    /// Encode `raster` to `path`, choosing the format from the path's extension.
    fn encode(
        &self,
        raster: &Self::Raster,
        path: &Path,
        params: &EncodeParams,
    ) -> Result<(), CodecError>;
}
