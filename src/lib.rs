//! # boxfit
//!
//! Resize an image file so it fits a width × height box, preserving aspect
//! ratio, with high-quality resampling.
//!
//! ```no_run
//! use boxfit::{BoxFitResizer, ResizeOutcome};
//!
//! let resizer = BoxFitResizer::new(1024, 768)?;
//! match resizer.resize("in/photo.jpg", "out/photo.jpg")? {
//!     ResizeOutcome::Resized(fit) => println!("{}x{}", fit.width, fit.height),
//!     ResizeOutcome::SourceMissing => println!("no such photo"),
//! }
//! # Ok::<(), boxfit::ResizeError>(())
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resizer`] | [`BoxFitResizer`]: validation, box-fit, decode → resample → encode, cleanup |
//! | [`imaging`] | Box-fit math, parameter types, the [`ImageCodec`](imaging::ImageCodec) trait and its `image`-crate implementation, DPI handling |
//! | [`config`] | `boxfit.toml` loading, merging and validation (CLI only) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Longer-Edge Fit
//!
//! The scale factor comes from the longer source edge: landscape and square
//! images take the box width, portrait images take the box height. This is
//! deliberately *not* `min(box_w / w, box_h / h)`; with a non-square box the
//! other edge can exceed the box (a 100×100 image in a 200×50 box becomes
//! 200×200). See [`imaging::calculate_box_fit`].
//!
//! ## Missing Source Is Not an Error
//!
//! [`BoxFitResizer::resize`] returns `Ok(ResizeOutcome::SourceMissing)` when
//! the source does not exist. Bad arguments, undecodable sources and write
//! failures are distinct [`ResizeError`] variants instead of one `false`.
//!
//! ## Injected Codec
//!
//! The resizer is generic over [`ImageCodec`](imaging::ImageCodec). The default
//! [`RustCodec`](imaging::RustCodec) uses the `image` crate; tests substitute a
//! recording mock so the scaling policy is checked without real pixels.
//!
//! ## Pixel Density Survives
//!
//! The `image` crate drops density metadata, so [`imaging::resolution`] reads
//! it from JPEG, PNG, TIFF and BMP containers and writes it back to output in
//! those formats. No other metadata is carried over.

pub mod config;
pub mod imaging;
pub mod output;
pub mod resizer;

pub use resizer::{BoxFitResizer, ResizeError, ResizeOutcome};

#[cfg(test)]
pub(crate) mod test_helpers;
