//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Bytes in one "megabyte" as used by the throughput formula (2^20)
pub const MEGABYTE: f64 = 1_048_576.0;

/// Unit every throughput sample is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThroughputUnit {
    /// Megabits per second (bytes * 8 / 2^20 per second)
    Bits,
    /// Megabytes per second (bytes / 2^20 per second)
    Bytes,
}

impl ThroughputUnit {
    /// Quantity transferred, in this unit's base (bits or bytes)
    pub fn quantity(&self, bytes: u64) -> f64 {
        match self {
            Self::Bits => bytes as f64 * 8.0,
            Self::Bytes => bytes as f64,
        }
    }

    /// Label printed after a throughput value
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bits => "Mbps",
            Self::Bytes => "MB/s",
        }
    }
}

impl Default for ThroughputUnit {
    fn default() -> Self {
        Self::Bits
    }
}

impl fmt::Display for ThroughputUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bits => write!(f, "bits"),
            Self::Bytes => write!(f, "bytes"),
        }
    }
}

impl FromStr for ThroughputUnit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bits" | "bit" | "mbps" => Ok(Self::Bits),
            "bytes" | "byte" | "mb/s" => Ok(Self::Bytes),
            other => Err(AppError::parse(format!("Unknown throughput unit: {}", other))),
        }
    }
}

/// Preset bundle of probe list, timeout, statistics depth and failure policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Two mirrors, mean only, upload estimate on, download failures tolerated
    Standard,
    /// All mirrors, mean/median/min/max, download success mandatory
    Detailed,
}

impl Profile {
    /// Whether an empty download sample set aborts the run
    pub fn download_mandatory(&self) -> bool {
        matches!(self, Self::Detailed)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Detailed => write!(f, "detailed"),
        }
    }
}

/// How the upload figure is obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UploadMode {
    /// No upload figure at all
    Disabled,
    /// Local buffer-duplication timing; not a network measurement
    Simulated,
    /// Real POST of a bounded payload to the given endpoint
    Http { url: String },
}

impl UploadMode {
    /// Name used in reports so a simulation is never mistaken for a measurement
    pub fn description(&self) -> String {
        match self {
            Self::Disabled => "disabled".to_string(),
            Self::Simulated => "local simulation".to_string(),
            Self::Http { url } => match url::Url::parse(url).ok().and_then(|u| u.host_str().map(String::from)) {
                Some(host) => format!("HTTP upload to {}", host),
                None => "HTTP upload".to_string(),
            },
        }
    }
}

/// What gets written to stdout at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Decorated human-readable report with progress lines
    Report,
    /// Comma-separated machine-readable values
    Simple,
    /// JSON document
    Json,
}

impl OutputMode {
    /// Progress lines only make sense for the human-readable report
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Report)
    }
}

/// Connection quality classification of the download mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ConnectionQuality {
    /// Classify a download throughput; boundaries fall to the lower tier
    pub fn classify(download: f64) -> Self {
        if download > 50.0 {
            Self::Excellent
        } else if download > 25.0 {
            Self::Good
        } else if download > 10.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Get descriptive text
    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }

    /// Get the traffic-light symbol used by the rich report
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Excellent => "🟢",
            Self::Good => "🟡",
            Self::Fair => "🟠",
            Self::Poor => "🔴",
        }
    }
}

impl fmt::Display for ConnectionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
