//! Pure calculation functions for box-fit dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! # Longer-edge policy
//!
//! The scale factor is chosen from the *longer source edge*: a landscape or
//! square source is scaled so its width equals the box width, a portrait source
//! so its height equals the box height. The other edge follows by the same
//! factor. This is not a min-of-both-ratios fit, so for a non-square box the
//! shorter edge can overflow the box:
//!
//! ```text
//! box 200x50, source 100x100  →  factor 2.0  →  200x200
//! ```

use super::backend::Dimensions;
use super::params::TargetBox;

/// Size produced by a box-fit, together with the factor that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleResult {
    pub width: u32,
    pub height: u32,
    pub factor: f64,
}

impl ScaleResult {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// True when either edge truncated to zero pixels.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the result lies inside the box on both axes.
    pub fn fits(&self, target: TargetBox) -> bool {
        self.width <= target.width() && self.height <= target.height()
    }
}

/// Compute the uniform scale factor for a source of `source_width` × `source_height`.
///
/// # Examples
/// ```
/// # use boxfit::imaging::{TargetBox, calculate_scale_factor};
/// let target = TargetBox::new(100, 100).unwrap();
/// assert_eq!(calculate_scale_factor(200.0, 100.0, target), 0.5);
/// assert_eq!(calculate_scale_factor(100.0, 200.0, target), 0.5);
/// ```
pub fn calculate_scale_factor(source_width: f64, source_height: f64, target: TargetBox) -> f64 {
    if source_width >= source_height {
        f64::from(target.width()) / source_width
    } else {
        f64::from(target.height()) / source_height
    }
}

/// Calculate the output size for a source image under the longer-edge policy.
///
/// Each edge is `trunc(edge * factor)`; the cast truncates toward zero, so an
/// extreme aspect ratio can yield a zero edge (see [`ScaleResult::is_degenerate`]).
///
/// # Examples
/// ```
/// # use boxfit::imaging::{Dimensions, TargetBox, calculate_box_fit};
/// let target = TargetBox::new(100, 100).unwrap();
/// let fit = calculate_box_fit(Dimensions { width: 200, height: 100 }, target);
/// assert_eq!((fit.width, fit.height), (100, 50));
/// ```
pub fn calculate_box_fit(source: Dimensions, target: TargetBox) -> ScaleResult {
    let src_w = f64::from(source.width);
    let src_h = f64::from(source.height);
    let factor = calculate_scale_factor(src_w, src_h, target);

    ScaleResult {
        width: (src_w * factor) as u32,
        height: (src_h * factor) as u32,
        factor,
    }
}
