//! Status lines and number formatting for terminal output

use grvlfinder_scoring::ScoreClass;
use owo_colors::OwoColorize;
use std::fmt::Display;

/// One-line status messages with a colored marker.
///
/// Errors and warnings go to stderr so they stay visible when stdout is piped.
pub struct Status;

impl Status {
    /// Green check mark
    pub fn success(message: &str) {
        println!("{} {message}", "✓".green());
    }

    /// Red cross, on stderr
    pub fn error(message: &str) {
        eprintln!("{} {message}", "✗".red());
    }

    /// Yellow warning sign, on stderr
    pub fn warning(message: &str) {
        eprintln!("{} {message}", "⚠".yellow());
    }

    /// Blue info sign
    pub fn info(message: &str) {
        println!("{} {message}", "ℹ".blue());
    }

    /// `[n/total]` prefix for commands with several stages
    pub fn step(n: usize, total: usize, message: &str) {
        let counter = format!("[{n}/{total}]");
        println!("{} {message}", counter.dimmed());
    }

    /// Bold title underlined to its width, after a blank line
    pub fn header(title: &str) {
        let rule = "─".repeat(title.chars().count());
        println!("\n{}\n{rule}", title.bold());
    }
}

/// Kilometers with one decimal, whole meters under 1 km
pub fn format_distance_km(km: f64) -> String {
    if km >= 1.0 {
        return format!("{km:.1} km");
    }
    format!("{:.0} m", km * 1000.0)
}

/// Percentage with one decimal
pub fn format_percent(percent: f64) -> String {
    format!("{percent:.1}%")
}

/// Colored dot followed by the class name
pub fn score_badge(class: ScoreClass) -> String {
    fn badge(dot: impl Display, name: impl Display) -> String {
        format!("{dot} {name}")
    }

    match class {
        ScoreClass::Green => badge("●".green(), "green".green()),
        ScoreClass::Yellow => badge("●".yellow(), "yellow".yellow()),
        ScoreClass::Red => badge("●".red(), "red".red()),
    }
}

/// `1 road`, `3 roads`
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    let noun = if count == 1 { singular } else { plural };
    format!("{count} {noun}")
}

/// Bytes in B, KB or MB (powers of 1024)
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [(u64, &str); 2] = [(1024 * 1024, "MB"), (1024, "KB")];

    UNITS
        .iter()
        .find(|(size, _)| bytes >= *size)
        .map_or_else(
            || format!("{bytes} B"),
            |(size, unit)| format!("{:.2} {unit}", bytes as f64 / *size as f64),
        )
}
