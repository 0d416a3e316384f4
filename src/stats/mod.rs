//! Aggregation of throughput samples into summary statistics

use crate::{
    error::{AppError, Result},
    models::metrics::{MetricSummary, ProbeKind, ProbeOutcome},
};

/// Computes mean/median/min/max over successful samples.
///
/// Aggregation is order-independent: the input is sorted internally and the
/// mean is a plain sum, so samples may arrive in any order.
pub struct Aggregator;

impl Aggregator {
    /// Summarize samples, or `None` when there are none.
    ///
    /// Non-finite values (NaN, infinities) are not samples and are skipped.
    pub fn summarize(samples: &[f64]) -> Option<MetricSummary> {
        let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }

        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let mid = count / 2;
        let median = if count % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        };

        Some(MetricSummary {
            // Clamp float rounding drift so min <= mean <= max always holds
            mean: mean.clamp(sorted[0], sorted[count - 1]),
            median,
            min: sorted[0],
            max: sorted[count - 1],
            count,
        })
    }

    /// Summary for a metric the run can live without: empty yields zeros
    pub fn optional(samples: &[f64]) -> MetricSummary {
        Self::summarize(samples).unwrap_or_else(MetricSummary::zero)
    }

    /// Summary for a metric the run cannot live without: empty is fatal
    pub fn mandatory(samples: &[f64]) -> Result<MetricSummary> {
        Self::summarize(samples).ok_or_else(|| AppError::test_execution("All speed tests failed!"))
    }

    /// Successful sample values of one probe kind
    pub fn samples(outcomes: &[ProbeOutcome], kind: ProbeKind) -> Vec<f64> {
        outcomes
            .iter()
            .filter(|o| o.kind == kind)
            .filter_map(|o| o.value)
            .collect()
    }
}
