//! Data models and structures for the speed test

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use metrics::{compute_throughput, display_host, MetricSummary, ProbeKind, ProbeOutcome, Sample, SpeedtestReport};
