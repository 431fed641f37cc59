//! Terminal capability detection and output helpers for the stats report

use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if terminal is narrow (< 40 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 40)
}

/// A horizontal rule as wide as `heading`, for underlining it.
pub fn rule(heading: &str) -> String {
    "─".repeat(heading.chars().count())
}

/// Right-aligns `value` after a left-aligned `label`, or puts both on one
/// `label: value` line when the terminal is narrow.
pub fn row(label: &str, value: usize, narrow: bool) -> String {
    if narrow {
        format!("{label}: {value}")
    } else {
        format!("{label:<12} {value:>10}")
    }
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as a heading (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn info(&self) -> String {
        if supports_color() {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn info(&self) -> String {
        self.as_str().info()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}
