//! Machine-readable comma-separated output

use super::formatter::ReportFormatter;
use crate::{error::Result, models::{MetricSummary, SpeedtestReport}};

/// Prints `download,upload,ping` with two decimals.
///
/// A metric that was skipped or produced no successful sample is an empty
/// field, so a failure is never confused with a measured zero.
pub struct SimpleFormatter;

fn field(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn summary_field(summary: Option<&MetricSummary>) -> String {
    field(summary.filter(|s| !s.is_empty()).map(|s| s.mean))
}

impl ReportFormatter for SimpleFormatter {
    fn format_ping(&self, ping_ms: f64) -> Result<String> {
        Ok(format!("{:.2}", ping_ms))
    }

    fn format_report(&self, report: &SpeedtestReport) -> Result<String> {
        Ok(format!(
            "{},{},{}",
            summary_field(Some(&report.download)),
            summary_field(report.upload.as_ref()),
            field(report.ping_ms)
        ))
    }
}
