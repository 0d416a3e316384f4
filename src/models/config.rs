//! Configuration data model and validation

use crate::defaults;
use crate::types::{AppError, OutputMode, Profile, Result, ThroughputUnit, UploadMode};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Preset the remaining fields were derived from
    pub profile: Profile,

    /// Host handed to the system ping utility; `None` skips the ping probe
    pub ping_host: Option<String>,

    /// Echo requests per ping probe
    pub ping_count: u32,

    /// Ping subprocess timeout; raised when the echo count needs longer
    pub ping_timeout_seconds: u64,

    /// Download probe targets, probed in order
    pub download_urls: Vec<String>,

    /// Per-download request timeout
    pub download_timeout_seconds: u64,

    /// Unit throughput samples are expressed in
    pub unit: ThroughputUnit,

    /// How the upload figure is obtained
    pub upload: UploadMode,

    /// Payload size for the upload simulation or HTTP upload
    pub upload_size_bytes: usize,

    /// Number of upload iterations averaged into the upload figure
    pub upload_iterations: u32,

    /// Only run the ping probe
    pub ping_only: bool,

    /// What gets printed at the end of the run
    pub output: OutputMode,

    /// Enable colored terminal output
    pub enable_color: bool,

    /// Enable verbose output
    pub verbose: bool,

    /// Enable debug output
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_profile(Profile::Standard)
    }
}

impl Config {
    /// Build the preset configuration for a profile
    pub fn for_profile(profile: Profile) -> Self {
        let (server_count, download_timeout, upload) = match profile {
            Profile::Standard => (
                defaults::STANDARD_SERVER_COUNT,
                defaults::STANDARD_DOWNLOAD_TIMEOUT,
                UploadMode::Simulated,
            ),
            Profile::Detailed => (
                defaults::DEFAULT_DOWNLOAD_URLS.len(),
                defaults::DETAILED_DOWNLOAD_TIMEOUT,
                UploadMode::Disabled,
            ),
        };

        Self {
            profile,
            ping_host: Some(defaults::DEFAULT_PING_HOST.to_string()),
            ping_count: defaults::DEFAULT_PING_COUNT,
            ping_timeout_seconds: defaults::DEFAULT_PING_TIMEOUT.as_secs(),
            download_urls: defaults::DEFAULT_DOWNLOAD_URLS
                .iter()
                .take(server_count)
                .map(|&s| s.to_string())
                .collect(),
            download_timeout_seconds: download_timeout.as_secs(),
            unit: ThroughputUnit::default(),
            upload,
            upload_size_bytes: defaults::DEFAULT_UPLOAD_SIZE,
            upload_iterations: defaults::DEFAULT_UPLOAD_ITERATIONS,
            ping_only: false,
            output: OutputMode::Report,
            enable_color: defaults::DEFAULT_ENABLE_COLOR,
            verbose: false,
            debug: false,
        }
    }

    /// Bound for the whole ping subprocess; `ping` sends one echo per second
    pub fn ping_timeout(&self) -> Duration {
        let needed = u64::from(self.ping_count) + defaults::PING_GRACE.as_secs();
        Duration::from_secs(self.ping_timeout_seconds.max(needed))
    }

    /// Get the download timeout as Duration
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_seconds)
    }

    /// Whether the download figure must come from at least one sample
    pub fn download_mandatory(&self) -> bool {
        self.profile.download_mandatory()
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if let Some(host) = &self.ping_host {
            if host.trim().is_empty() {
                return Err(AppError::config("Ping host cannot be empty"));
            }
        } else if self.ping_only {
            return Err(AppError::config("--ping-only cannot be combined with --no-ping"));
        }

        if self.ping_count == 0 || self.ping_count > 100 {
            return Err(AppError::config(format!("Ping count must be between 1 and 100, got: {}", self.ping_count)));
        }

        validate_timeout("Ping timeout", self.ping_timeout_seconds)?;
        validate_timeout("Download timeout", self.download_timeout_seconds)?;

        if self.download_urls.is_empty() && !self.ping_only {
            return Err(AppError::config("At least one download URL is required"));
        }

        for url in &self.download_urls {
            validate_http_url("download", url)?;
        }

        if let UploadMode::Http { url } = &self.upload {
            validate_http_url("upload", url)?;
        }

        if self.upload_size_bytes == 0 || self.upload_size_bytes > defaults::MAX_UPLOAD_SIZE {
            return Err(AppError::config(format!(
                "Upload size must be between 1 and {} bytes, got: {}",
                defaults::MAX_UPLOAD_SIZE,
                self.upload_size_bytes
            )));
        }

        if self.upload_iterations == 0 || self.upload_iterations > 100 {
            return Err(AppError::config(format!(
                "Upload iterations must be between 1 and 100, got: {}",
                self.upload_iterations
            )));
        }

        Ok(())
    }
}

fn validate_timeout(name: &str, seconds: u64) -> Result<()> {
    if seconds == 0 {
        return Err(AppError::config(format!("{} must be greater than 0", name)));
    }
    if seconds > 300 {
        return Err(AppError::config(format!("{} cannot exceed 300 seconds", name)));
    }
    Ok(())
}

fn validate_http_url(kind: &str, url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(AppError::config(format!("The {} URL cannot be empty", kind)));
    }

    let parsed = url::Url::parse(url)
        .map_err(|e| AppError::config(format!("Invalid {} URL '{}': {}", kind, url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::config(format!(
            "The {} URL must use http or https, got '{}': {}",
            kind, other, url
        ))),
    }
}
