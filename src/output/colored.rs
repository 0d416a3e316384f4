//! Colored formatter implementation with terminal color support
//!
//! Uses ANSI colors on top of the shared report layout.

use super::formatter::{render_report, FormattingOptions, Palette, ReportFormatter};
use crate::{error::Result, models::SpeedtestReport, types::ConnectionQuality};
use colored::*;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub value: Color,
    pub error: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            value: Color::Cyan,
            error: Color::Red,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Color for a connection quality tier
fn quality_color(quality: ConnectionQuality) -> Color {
    match quality {
        ConnectionQuality::Excellent => Color::Green,
        ConnectionQuality::Good => Color::Yellow,
        ConnectionQuality::Fair => Color::BrightYellow,
        ConnectionQuality::Poor => Color::Red,
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn paint(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.options.enable_color {
            return text.to_string();
        }
        let colored = text.color(color);
        if bold {
            colored.bold().to_string()
        } else {
            colored.to_string()
        }
    }
}

impl Palette for ColoredFormatter {
    fn heading(&self, text: &str) -> String {
        self.paint(text, self.color_scheme.header, true)
    }

    fn rule(&self, text: &str) -> String {
        self.paint(text, self.color_scheme.border, false)
    }

    fn value(&self, text: &str) -> String {
        self.paint(text, self.color_scheme.value, true)
    }

    fn muted(&self, text: &str) -> String {
        self.paint(text, self.color_scheme.muted, false)
    }

    fn failure(&self, text: &str) -> String {
        self.paint(text, self.color_scheme.error, false)
    }

    fn quality(&self, quality: ConnectionQuality) -> String {
        format!(
            "{} {}",
            quality.symbol(),
            self.paint(quality.description(), quality_color(quality), true)
        )
    }
}

impl ReportFormatter for ColoredFormatter {
    fn format_ping(&self, ping_ms: f64) -> Result<String> {
        Ok(format!("Ping: {}", self.value(&format!("{:.2} ms", ping_ms))))
    }

    fn format_report(&self, report: &SpeedtestReport) -> Result<String> {
        render_report(report, &self.options, self)
    }
}
