//! Spinners for service calls and a percentage bar for route analysis

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Spinner that ticks on its own until finished
pub fn spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .map_or_else(|_| ProgressStyle::default_spinner(), |s| s.tick_chars(SPINNER_TICKS));

    let pb = ProgressBar::new_spinner().with_style(style).with_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Bar from 0 to 100, set from the analysis progress callback
pub fn percent_bar(message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos:>3}%")
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("█▓░"));

    ProgressBar::new(100).with_style(style).with_message(message.to_string())
}

/// Stop `pb` and leave a check mark line
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {message}"));
}

/// Stop `pb` and leave a cross line
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.abandon_with_message(format!("✗ {message}"));
}
