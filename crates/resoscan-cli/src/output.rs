//! Text formatting shared by the presenters.

use std::path::Path;
use std::time::Duration;

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.2}s")
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:02.0}s")
    } else {
        let hours = (secs / 3600.0).floor() as u64;
        let mins = ((secs - hours as f64 * 3600.0) / 60.0).floor() as u64;
        format!("{hours}h{mins:02}m")
    }
}

/// `path` relative to `root` when it lies below it, unchanged otherwise.
#[must_use]
pub fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Replace every occurrence of `root` in `text` with `.` so planned commands
/// stay readable.
#[must_use]
pub fn shorten(text: &str, root: &Path) -> String {
    let root = root.display().to_string();
    if root.is_empty() || root == "/" {
        return text.to_string();
    }
    text.replace(&root, ".")
}

/// `n thing` or `n things`.
#[must_use]
pub fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
