//! CLI output formatting.
//!
//! Output is a header line naming the file(s) involved, followed by indented
//! context lines:
//!
//! ```text
//! photo.jpg → photo-small.jpg
//!     Box: 200x50
//!     Size: 200x200 (scale 2)
//!     Exceeds box height by 150px
//! ```
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O and no side effects. Diagnostics go through `tracing` to
//! stderr, never through here.

use crate::imaging::{ScaleResult, TargetBox};
use crate::resizer::ResizeOutcome;
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Lines describing a computed size relative to the box.
fn size_lines(fit: &ScaleResult, target: TargetBox) -> Vec<String> {
    let mut lines = vec![
        format!("{}Box: {}", indent(1), target),
        format!(
            "{}Size: {}x{} (scale {})",
            indent(1),
            fit.width,
            fit.height,
            fit.factor
        ),
    ];
    if fit.width > target.width() {
        lines.push(format!(
            "{}Exceeds box width by {}px",
            indent(1),
            fit.width - target.width()
        ));
    }
    if fit.height > target.height() {
        lines.push(format!(
            "{}Exceeds box height by {}px",
            indent(1),
            fit.height - target.height()
        ));
    }
    lines
}

pub fn format_resize_output(
    source: &Path,
    destination: &Path,
    target: TargetBox,
    outcome: &ResizeOutcome,
) -> Vec<String> {
    match outcome {
        ResizeOutcome::Resized(fit) => {
            let mut lines = vec![format!("{} → {}", source.display(), destination.display())];
            lines.extend(size_lines(fit, target));
            lines
        }
        ResizeOutcome::SourceMissing => vec![format!(
            "{}: source not found, nothing written",
            source.display()
        )],
    }
}

pub fn print_resize_output(
    source: &Path,
    destination: &Path,
    target: TargetBox,
    outcome: &ResizeOutcome,
) {
    for line in format_resize_output(source, destination, target, outcome) {
        println!("{}", line);
    }
}

pub fn format_plan_output(
    source: &Path,
    target: TargetBox,
    plan: Option<&ScaleResult>,
) -> Vec<String> {
    match plan {
        Some(fit) => {
            let mut lines = vec![source.display().to_string()];
            lines.extend(size_lines(fit, target));
            lines
        }
        None => vec![format!("{}: source not found", source.display())],
    }
}

pub fn print_plan_output(source: &Path, target: TargetBox, plan: Option<&ScaleResult>) {
    for line in format_plan_output(source, target, plan) {
        println!("{}", line);
    }
}
