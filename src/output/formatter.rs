//! Core formatting traits and the plain text report
//!
//! The human-readable report layout lives here once and is shared by the
//! plain and colored formatters through the [`Palette`] trait.

use crate::{
    error::{AppError, Result},
    models::{MetricSummary, ProbeKind, SpeedtestReport},
    types::{ConnectionQuality, Profile, ThroughputUnit},
};
use std::fmt::Write as _;

/// Width of the report separator lines
pub(crate) const RULE_WIDTH: usize = 50;

/// Main trait for output formatting
pub trait ReportFormatter: Send + Sync {
    /// Format the result of a ping-only run
    fn format_ping(&self, ping_ms: f64) -> Result<String>;

    /// Format the result of a full run
    fn format_report(&self, report: &SpeedtestReport) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone, Default)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// List every probe attempt under the summary
    pub show_probes: bool,
}

/// Styling hooks applied to the shared report layout
pub(crate) trait Palette {
    fn heading(&self, text: &str) -> String;
    fn rule(&self, text: &str) -> String;
    fn value(&self, text: &str) -> String;
    fn muted(&self, text: &str) -> String;
    fn failure(&self, text: &str) -> String;
    fn quality(&self, quality: ConnectionQuality) -> String;
}

fn io_error(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format report: {}", e))
}

fn throughput(value: f64, unit: ThroughputUnit) -> String {
    format!("{:.2} {}", value, unit.label())
}

/// Render the human-readable report with the given palette
pub(crate) fn render_report(report: &SpeedtestReport, options: &FormattingOptions, palette: &dyn Palette) -> Result<String> {
    let mut output = String::new();
    let rule = palette.rule(&"=".repeat(RULE_WIDTH));
    let unit = report.unit;

    writeln!(output).map_err(io_error)?;
    writeln!(output, "{}", rule).map_err(io_error)?;
    writeln!(output, "{}", palette.heading("📊 SPEEDTEST RESULTS")).map_err(io_error)?;
    writeln!(output, "{}", rule).map_err(io_error)?;

    let ping = match (report.ping_ms, &report.ping_error) {
        (Some(ms), _) => palette.value(&format!("{:.2} ms", ms)),
        (None, Some(error)) => palette.failure(&format!("unavailable ({})", error)),
        (None, None) => palette.muted("skipped"),
    };
    writeln!(output, "📡 Ping:        {}", ping).map_err(io_error)?;

    let download = if report.download.is_empty() {
        palette.failure("no successful samples")
    } else {
        palette.value(&throughput(report.download.mean, unit))
    };
    writeln!(output, "⬇️  Download:    {}", download).map_err(io_error)?;

    if report.profile == Profile::Detailed && !report.download.is_empty() {
        write_statistics(&mut output, &report.download, report.failure_count(ProbeKind::Download), unit, palette)?;
    }

    if let Some(upload) = &report.upload {
        let figure = if upload.is_empty() {
            palette.failure("no successful samples")
        } else {
            palette.value(&throughput(upload.mean, unit))
        };
        writeln!(
            output,
            "⬆️  Upload:      {} {}",
            figure,
            palette.muted(&format!("({})", report.upload_mode.description()))
        )
        .map_err(io_error)?;
    }

    writeln!(output, "{}", rule).map_err(io_error)?;
    write!(output, "Connection Quality: {}", palette.quality(report.quality)).map_err(io_error)?;

    if options.show_probes {
        write_probes(&mut output, report, palette)?;
    }

    Ok(output)
}

fn write_statistics(
    output: &mut String,
    summary: &MetricSummary,
    failures: usize,
    unit: ThroughputUnit,
    palette: &dyn Palette,
) -> Result<()> {
    writeln!(output, "    Average:    {}", palette.value(&throughput(summary.mean, unit))).map_err(io_error)?;
    writeln!(output, "    Median:     {}", palette.value(&throughput(summary.median, unit))).map_err(io_error)?;
    writeln!(output, "    Min:        {}", palette.value(&throughput(summary.min, unit))).map_err(io_error)?;
    writeln!(output, "    Max:        {}", palette.value(&throughput(summary.max, unit))).map_err(io_error)?;

    let tests = if failures > 0 {
        format!("{} successful, {} failed", summary.count, failures)
    } else {
        format!("{} successful", summary.count)
    };
    writeln!(output, "    Tests:      {}", palette.muted(&tests)).map_err(io_error)?;
    Ok(())
}

fn write_probes(output: &mut String, report: &SpeedtestReport, palette: &dyn Palette) -> Result<()> {
    writeln!(output).map_err(io_error)?;
    writeln!(output).map_err(io_error)?;
    write!(output, "{}", palette.heading("Probes:")).map_err(io_error)?;

    for probe in &report.probes {
        let kind = match probe.kind {
            ProbeKind::Ping => "ping",
            ProbeKind::Download => "download",
            ProbeKind::Upload => "upload",
        };
        let result = match (probe.value, &probe.error) {
            (Some(value), _) if probe.kind == ProbeKind::Ping => palette.value(&format!("{:.2} ms", value)),
            (Some(value), _) => palette.value(&throughput(value, report.unit)),
            (None, error) => palette.failure(&format!("failed: {}", error.as_deref().unwrap_or("unknown error"))),
        };
        write!(
            output,
            "\n  {:<9} {:<24} {} {}",
            kind,
            probe.display_target(),
            result,
            palette.muted(&format!("[{:.0} ms]", probe.elapsed_ms()))
        )
        .map_err(io_error)?;
    }
    Ok(())
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl Palette for PlainFormatter {
    fn heading(&self, text: &str) -> String {
        text.to_string()
    }

    fn rule(&self, text: &str) -> String {
        text.to_string()
    }

    fn value(&self, text: &str) -> String {
        text.to_string()
    }

    fn muted(&self, text: &str) -> String {
        text.to_string()
    }

    fn failure(&self, text: &str) -> String {
        text.to_string()
    }

    fn quality(&self, quality: ConnectionQuality) -> String {
        format!("{} {}", quality.symbol(), quality)
    }
}

impl ReportFormatter for PlainFormatter {
    fn format_ping(&self, ping_ms: f64) -> Result<String> {
        Ok(format!("Ping: {:.2} ms", ping_ms))
    }

    fn format_report(&self, report: &SpeedtestReport) -> Result<String> {
        render_report(report, &self.options, self)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn plain(show_probes: bool) -> PlainFormatter {
        PlainFormatter::new(FormattingOptions {
            enable_color: false,
            show_probes,
        })
    }

    #[test]
    fn test_ping_only() {
        assert_eq!(plain(false).format_ping(12.345).unwrap(), "Ping: 12.35 ms");
        assert_eq!(plain(false).format_ping(7.0).unwrap(), "Ping: 7.00 ms");
    }

    #[test]
    fn test_standard_report() {
        let output = plain(false).format_report(&standard_report()).unwrap();

        assert!(output.contains("📊 SPEEDTEST RESULTS"));
        assert!(output.contains("📡 Ping:        12.34 ms"));
        assert!(output.contains("⬇️  Download:    45.67 Mbps"));
        assert!(output.contains("⬆️  Upload:      5.00 Mbps (local simulation)"));
        assert!(output.ends_with("Connection Quality: 🟡 Good"));
        assert!(!output.contains("Median"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_detailed_report_has_statistics() {
        let output = plain(false).format_report(&detailed_report()).unwrap();

        assert!(output.contains("⬇️  Download:    45.67 MB/s"));
        assert!(output.contains("    Median:     45.67 MB/s"));
        assert!(output.contains("    Min:        40.00 MB/s"));
        assert!(output.contains("    Max:        51.34 MB/s"));
        assert!(output.contains("    Tests:      2 successful, 1 failed"));
        assert!(!output.contains("Upload"));
    }

    #[test]
    fn test_ping_unavailable_and_skipped() {
        let mut report = standard_report();
        report.ping_ms = None;
        report.ping_error = Some("Ping error: 'ping' utility not found".to_string());
        let output = plain(false).format_report(&report).unwrap();
        assert!(output.contains("📡 Ping:        unavailable (Ping error: 'ping' utility not found)"));

        report.ping_error = None;
        let output = plain(false).format_report(&report).unwrap();
        assert!(output.contains("📡 Ping:        skipped"));
    }

    #[test]
    fn test_empty_download_is_not_printed_as_zero() {
        let mut report = standard_report();
        report.download = MetricSummary::zero();
        let output = plain(false).format_report(&report).unwrap();
        assert!(output.contains("⬇️  Download:    no successful samples"));
    }

    #[test]
    fn test_probe_listing() {
        let output = plain(true).format_report(&standard_report()).unwrap();
        assert!(output.contains("Probes:"));
        assert!(output.contains("speedtest.tele2.net"));
        assert!(output.contains("failed: Timeout error: operation timed out"));
    }
}
