//! Probe outcomes, aggregate summaries and the final report

use crate::error::{AppError, Result};
use crate::types::{ConnectionQuality, Profile, ThroughputUnit, UploadMode, MEGABYTE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a probe measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Ping,
    Download,
    Upload,
}

/// Throughput of `bytes` moved in `elapsed`, normalized by 2^20.
///
/// `None` for a zero (or unmeasurably small) duration.
pub fn compute_throughput(bytes: u64, elapsed: Duration, unit: ThroughputUnit) -> Option<f64> {
    let seconds = elapsed.as_secs_f64();
    if seconds <= 0.0 {
        return None;
    }
    Some(unit.quantity(bytes) / seconds / MEGABYTE)
}

/// Host part of a URL target, or the target itself when it is not a URL
pub fn display_host(target: &str) -> String {
    url::Url::parse(target)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_else(|| target.to_string())
}

/// One successful throughput measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Throughput in the configured unit
    pub value: f64,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl Sample {
    /// Build a sample from a timed transfer using the throughput formula
    pub fn from_transfer(bytes: u64, elapsed: Duration, unit: ThroughputUnit) -> Result<Self> {
        let value = compute_throughput(bytes, elapsed, unit)
            .ok_or_else(|| AppError::statistics("Transfer finished in zero elapsed time"))?;
        Ok(Self { value, bytes, elapsed })
    }
}

/// Result of one timed probe attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// What was measured
    pub kind: ProbeKind,

    /// URL, host, or payload description the probe ran against
    pub target: String,

    /// Milliseconds for ping, throughput in the report unit otherwise.
    /// `None` when the probe failed.
    pub value: Option<f64>,

    /// Bytes moved by the probe (0 for ping)
    pub bytes: u64,

    /// Wall-clock time the probe took
    pub elapsed: Duration,

    /// Error category and message if the probe failed
    pub error: Option<String>,

    /// When the probe finished
    pub timestamp: DateTime<Utc>,
}

impl ProbeOutcome {
    /// Create a successful outcome
    pub fn success(kind: ProbeKind, target: impl Into<String>, value: f64, bytes: u64, elapsed: Duration) -> Self {
        Self {
            kind,
            target: target.into(),
            value: Some(value),
            bytes,
            elapsed,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a successful outcome from a throughput sample
    pub fn from_sample(kind: ProbeKind, target: impl Into<String>, sample: &Sample) -> Self {
        Self::success(kind, target, sample.value, sample.bytes, sample.elapsed)
    }

    /// Create a failed outcome
    pub fn failed(kind: ProbeKind, target: impl Into<String>, error: &AppError, elapsed: Duration) -> Self {
        Self {
            kind,
            target: target.into(),
            value: None,
            bytes: 0,
            elapsed,
            error: Some(error.to_string()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.value.is_some()
    }

    /// Host part of the target, falling back to the raw target
    pub fn display_target(&self) -> String {
        display_host(&self.target)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Aggregate statistics over the successful samples of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Number of successful samples the summary was computed from
    pub count: usize,
}

impl MetricSummary {
    /// Zero-valued summary used when an optional metric has no samples
    pub fn zero() -> Self {
        Self {
            mean: 0.0,
            median: 0.0,
            min: 0.0,
            max: 0.0,
            count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Complete result of one full speed test run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedtestReport {
    pub profile: Profile,
    pub unit: ThroughputUnit,

    /// Average round-trip time; `None` when skipped or failed
    pub ping_ms: Option<f64>,

    /// Why the ping probe produced no value, if it ran and failed
    pub ping_error: Option<String>,

    pub download: MetricSummary,

    /// `None` when the upload figure is disabled
    pub upload: Option<MetricSummary>,

    pub upload_mode: UploadMode,

    /// Classification of the download mean
    pub quality: ConnectionQuality,

    /// Every probe attempt, in execution order
    pub probes: Vec<ProbeOutcome>,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl SpeedtestReport {
    /// Probe outcomes of one kind, in execution order
    pub fn outcomes(&self, kind: ProbeKind) -> impl Iterator<Item = &ProbeOutcome> {
        self.probes.iter().filter(move |p| p.kind == kind)
    }

    /// Number of failed probes of one kind
    pub fn failure_count(&self, kind: ProbeKind) -> usize {
        self.outcomes(kind).filter(|p| !p.is_successful()).count()
    }

    /// Total run duration
    pub fn duration(&self) -> Duration {
        (self.completed_at - self.started_at).to_std().unwrap_or(Duration::ZERO)
    }
}
