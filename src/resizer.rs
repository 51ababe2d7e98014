//! Box-fit resizing of a single image file.
//!
//! [`BoxFitResizer`] holds a [`TargetBox`] and a codec, and turns one source
//! file into one resized destination file per [`resize`](BoxFitResizer::resize)
//! call. The size comes from [`calculate_box_fit`] (longer-edge policy); pixel
//! work is delegated to the [`ImageCodec`].
//!
//! # Outcomes
//!
//! A missing source file is an expected outcome, not an error: `resize` returns
//! `Ok(ResizeOutcome::SourceMissing)`. Everything else that goes wrong is a
//! distinct [`ResizeError`] variant.
//!
//! # Destination hygiene
//!
//! After a resize that does not succeed, the destination holds no file:
//! a stale file is removed when the source is missing, and an output guard
//! removes whatever is at the destination when decode, resample or encode fails.
//! Argument errors are raised before anything is touched.

use crate::imaging::{
    CodecError, EncodeParams, ImageCodec, InvalidTargetBox, Quality, Raster, ResampleFilter,
    RustCodec, ScaleResult, TargetBox, calculate_box_fit,
};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No encoder for output format of {}", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("Failed to encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },
    #[error("Scaled size {width}x{height} has an empty edge")]
    DegenerateSize { width: u32, height: u32 },
}

impl ResizeError {
    /// Attach the file a codec error happened on.
    fn from_codec(err: CodecError, path: &Path) -> Self {
        let path = path.to_path_buf();
        match err {
            CodecError::Io(source) => Self::Io { path, source },
            CodecError::Decode(message) => Self::Decode { path, message },
            CodecError::UnsupportedFormat(_) => Self::UnsupportedFormat { path },
            CodecError::Encode(message) => Self::Encode { path, message },
        }
    }
}

impl From<InvalidTargetBox> for ResizeError {
    fn from(err: InvalidTargetBox) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Result of a [`BoxFitResizer::resize`] call that raised no error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    /// The destination was written at the given size.
    Resized(ScaleResult),
    /// The source file does not exist; nothing was written.
    SourceMissing,
}

impl ResizeOutcome {
    /// The plain success flag, for callers that only need a boolean.
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Resized(_))
    }
}

/// Removes the destination on drop unless committed.
struct OutputGuard<'a> {
    path: &'a Path,
    armed: bool,
}

impl<'a> OutputGuard<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, armed: true }
    }

    fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for OutputGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            remove_destination(self.path);
        }
    }
}

/// Best-effort removal of a regular file at `path`.
fn remove_destination(path: &Path) {
    if !path.is_file() {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed destination file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Could not remove destination file"),
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn require_path(path: &Path, name: &str) -> Result<(), ResizeError> {
    if path.as_os_str().is_empty() {
        return Err(ResizeError::InvalidArgument(format!("{name} path is empty")));
    }
    Ok(())
}

/// Resizes images to fit a fixed box, preserving aspect ratio.
///
/// Holds no per-call state, so one instance can serve any number of calls,
/// including from several threads at once as long as destinations differ.
///
/// ```no_run
/// use boxfit::BoxFitResizer;
///
/// let resizer = BoxFitResizer::new(800, 600)?;
/// let outcome = resizer.resize("photo.jpg", "photo-small.jpg")?;
/// if !outcome.succeeded() {
///     eprintln!("photo.jpg not found");
/// }
/// # Ok::<(), boxfit::ResizeError>(())
/// ```
pub struct BoxFitResizer<C: ImageCodec = RustCodec> {
    target: TargetBox,
    codec: C,
    filter: ResampleFilter,
    encode: EncodeParams,
}

impl BoxFitResizer<RustCodec> {
    /// Create a resizer for a `width` × `height` box using the `image` crate.
    ///
    /// Fails with [`ResizeError::InvalidArgument`] if either side is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, ResizeError> {
        Ok(Self::with_codec(TargetBox::new(width, height)?, RustCodec::new()))
    }
}

impl<C: ImageCodec> BoxFitResizer<C> {
    pub fn with_codec(target: TargetBox, codec: C) -> Self {
        Self {
            target,
            codec,
            filter: ResampleFilter::default(),
            encode: EncodeParams::default(),
        }
    }

    pub fn filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn quality(mut self, quality: Quality) -> Self {
        self.encode.quality = quality;
        self
    }

    pub fn target(&self) -> TargetBox {
        self.target
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Report the size [`resize`](Self::resize) would produce, reading only the
    /// image header. `None` when the source does not exist.
    pub fn plan(&self, source: impl AsRef<Path>) -> Result<Option<ScaleResult>, ResizeError> {
        let source = source.as_ref();
        require_path(source, "source")?;
        if !source.is_file() {
            return Ok(None);
        }
        let dims = self
            .codec
            .identify(source)
            .map_err(|e| ResizeError::from_codec(e, source))?;
        Ok(Some(calculate_box_fit(dims, self.target)))
    }

    /// Resize `source` into the box and write the result to `destination`.
    ///
    /// The output format follows the destination's extension. The source's
    /// pixel density is carried over to the output.
    pub fn resize(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
    ) -> Result<ResizeOutcome, ResizeError> {
        let (source, destination) = (source.as_ref(), destination.as_ref());
        require_path(source, "source")?;
        require_path(destination, "destination")?;

        if !source.is_file() {
            debug!(source = %source.display(), "Source image not found");
            remove_destination(destination);
            return Ok(ResizeOutcome::SourceMissing);
        }
        if is_same_file(source, destination) {
            return Err(ResizeError::InvalidArgument(format!(
                "destination {} is the source file",
                destination.display()
            )));
        }

        let guard = OutputGuard::new(destination);

        let decoded = self
            .codec
            .decode(source)
            .map_err(|e| ResizeError::from_codec(e, source))?;
        let src_dims = decoded.dimensions();
        let fit = calculate_box_fit(src_dims, self.target);
        debug!(
            source = %source.display(),
            src_width = src_dims.width,
            src_height = src_dims.height,
            factor = fit.factor,
            width = fit.width,
            height = fit.height,
            "Planned box fit"
        );
        if fit.is_degenerate() {
            return Err(ResizeError::DegenerateSize {
                width: fit.width,
                height: fit.height,
            });
        }

        let mut resized = self
            .codec
            .resample(&decoded, fit.dimensions(), self.filter)
            .map_err(|e| ResizeError::from_codec(e, source))?;
        resized.set_resolution(decoded.resolution());
        drop(decoded);

        self.codec
            .encode(&resized, destination, &self.encode)
            .map_err(|e| ResizeError::from_codec(e, destination))?;
        guard.commit();

        info!(
            destination = %destination.display(),
            width = fit.width,
            height = fit.height,
            "Wrote resized image"
        );
        Ok(ResizeOutcome::Resized(fit))
    }
}
