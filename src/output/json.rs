//! JSON report output

use super::formatter::ReportFormatter;
use crate::{error::Result, models::SpeedtestReport};
use serde_json::json;

/// Serializes the report as a pretty-printed JSON document
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format_ping(&self, ping_ms: f64) -> Result<String> {
        Ok(serde_json::to_string_pretty(&json!({ "ping_ms": ping_ms }))?)
    }

    fn format_report(&self, report: &SpeedtestReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::formatter::fixtures::standard_report;
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_ping_document() {
        let output = JsonFormatter.format_ping(12.34).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["ping_ms"], 12.34);
    }

    #[test]
    fn test_report_document() {
        let output = JsonFormatter.format_report(&standard_report()).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["profile"], "standard");
        assert_eq!(parsed["unit"], "bits");
        assert_eq!(parsed["ping_ms"], 12.34);
        assert_eq!(parsed["download"]["mean"], 45.67);
        assert_eq!(parsed["download"]["count"], 2);
        assert_eq!(parsed["upload_mode"]["kind"], "simulated");
        assert_eq!(parsed["quality"], "Good");
        assert_eq!(parsed["probes"].as_array().unwrap().len(), 3);
        assert_eq!(parsed["probes"][2]["value"], Value::Null);
    }

    #[test]
    fn test_report_round_trips() {
        let report = standard_report();
        let output = JsonFormatter.format_report(&report).unwrap();
        let parsed: SpeedtestReport = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.download, report.download);
        assert_eq!(parsed.upload_mode, report.upload_mode);
    }
}
