//! Niu-Speedtest
//!
//! A simple command-line speed test: measures ping latency with the system
//! ping utility, download throughput from fixed public mirrors, and an upload
//! figure that is either a clearly labelled local simulation or a real HTTP
//! upload to a user-supplied endpoint.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, MetricSummary, ProbeOutcome, SpeedtestReport};
pub use stats::Aggregator;
pub use types::{ConnectionQuality, OutputMode, Profile, ThroughputUnit, UploadMode};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_PING_HOST: &str = "8.8.8.8";
    pub const DEFAULT_PING_COUNT: u32 = 4;
    pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(10);
    /// Slack on top of one second per echo when the count outgrows the timeout
    pub const PING_GRACE: Duration = Duration::from_secs(5);

    pub const DEFAULT_DOWNLOAD_URLS: &[&str] = &[
        "http://speedtest.tele2.net/1MB.zip",
        "http://speedtest.tele2.net/10MB.zip",
        "http://proof.ovh.net/files/1Mb.dat",
        "http://proof.ovh.net/files/10Mb.dat",
    ];
    /// Mirrors probed by the standard profile (a prefix of the list above)
    pub const STANDARD_SERVER_COUNT: usize = 2;
    pub const STANDARD_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DETAILED_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

    pub const DEFAULT_UPLOAD_SIZE: usize = 1_048_576;
    pub const DEFAULT_UPLOAD_ITERATIONS: u32 = 2;
    pub const MAX_UPLOAD_SIZE: usize = 64 * 1_048_576;
    /// Scale applied to the simulated upload figure
    pub const SIMULATED_UPLOAD_SCALE: f64 = 0.1;
    /// Ceiling of the simulated upload figure
    pub const SIMULATED_UPLOAD_CEILING: f64 = 50.0;

    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
