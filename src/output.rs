//! CLI output formatting for run summaries.
//!
//! # Output Format
//!
//! ```text
//! Optimization completed: 3 images optimized in 1 folder
//!
//! Errors (1)
//!     photos/broken.jpg
//!         Failed to decode photos/broken.jpg: The image format could not be determined
//! ```
//!
//! # Architecture
//!
//! Each `format_*` function returns `Vec<String>` (or a `String`) for
//! testability and has a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::RunSummary;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Show `path` relative to `base` when possible.
fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(|rel| rel.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}

/// Format the end-of-run summary, listing errors after the headline.
pub fn format_summary(summary: &RunSummary, input: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Optimization completed: {} optimized in {}",
        plural(summary.images_processed, "image", "images"),
        plural(summary.folders_processed, "folder", "folders"),
    )];

    if summary.has_errors() {
        lines.push(String::new());
        lines.push(format!("Errors ({})", summary.errors.len()));
        for error in &summary.errors {
            lines.push(format!("{}{}", indent(1), display_path(&error.path, input)));
            lines.push(format!("{}{}", indent(2), error.message));
        }
    }

    lines
}

pub fn print_summary(summary: &RunSummary, input: &Path) {
    for line in format_summary(summary, input) {
        println!("{}", line);
    }
}

/// Format the summary as pretty-printed JSON.
pub fn format_summary_json(summary: &RunSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}
