//! Output formatting for speed test results
//!
//! Human-readable reports come in plain and colored flavours sharing one
//! layout; `--simple` and `--json` produce machine-readable output.

mod colored;
mod formatter;
mod json;
mod simple;

pub use colored::{ColorScheme, ColoredFormatter};
pub use formatter::{FormattingOptions, PlainFormatter, ReportFormatter};
pub use json::JsonFormatter;
pub use simple::SimpleFormatter;

use crate::{models::Config, types::OutputMode};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter for an output mode and color preference
    pub fn create_formatter(mode: OutputMode, enable_color: bool, show_probes: bool) -> Box<dyn ReportFormatter> {
        match mode {
            OutputMode::Simple => Box::new(SimpleFormatter),
            OutputMode::Json => Box::new(JsonFormatter),
            OutputMode::Report => {
                let options = FormattingOptions {
                    enable_color,
                    show_probes,
                };
                if enable_color {
                    Box::new(ColoredFormatter::new(options))
                } else {
                    Box::new(PlainFormatter::new(options))
                }
            }
        }
    }

    /// Create the formatter a configuration asks for
    pub fn for_config(config: &Config) -> Box<dyn ReportFormatter> {
        Self::create_formatter(config.output, config.enable_color, config.verbose || config.debug)
    }
}
