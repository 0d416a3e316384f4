//! Measurement probes: ping latency, download throughput, upload figure
//!
//! Each probe sits behind an async trait so the session runner can be driven
//! by real network probes in production and by mocks in tests.

pub mod download;
pub mod ping;
pub mod upload;

use crate::{
    error::Result,
    models::{Config, Sample},
    types::{ThroughputUnit, UploadMode},
};
use async_trait::async_trait;
use std::sync::Arc;

pub use download::HttpDownloadProber;
pub use ping::{parse_ping_average, SystemPing};
pub use upload::{HttpUploadProber, SimulatedUpload};

/// Measures average round-trip latency to a host
#[async_trait]
pub trait PingProber: Send + Sync {
    /// Average round-trip time in milliseconds
    async fn ping(&self, host: &str) -> Result<f64>;
}

/// Measures download throughput from one URL
#[async_trait]
pub trait DownloadProber: Send + Sync {
    async fn download(&self, url: &str, unit: ThroughputUnit) -> Result<Sample>;
}

/// Produces one upload throughput figure per call
#[async_trait]
pub trait UploadProber: Send + Sync {
    /// What the upload runs against, for progress lines and logs
    fn target(&self) -> String;

    async fn upload(&self, unit: ThroughputUnit) -> Result<Sample>;
}

/// The set of probes one session runs with
#[derive(Clone)]
pub struct ProbeSet {
    pub ping: Arc<dyn PingProber>,
    pub download: Arc<dyn DownloadProber>,
    /// `None` when the upload figure is disabled
    pub upload: Option<Arc<dyn UploadProber>>,
}

impl ProbeSet {
    /// Build the real network probes described by the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let upload: Option<Arc<dyn UploadProber>> = match &config.upload {
            UploadMode::Disabled => None,
            UploadMode::Simulated => Some(Arc::new(SimulatedUpload::new(config.upload_size_bytes))),
            UploadMode::Http { url } => Some(Arc::new(HttpUploadProber::new(
                url.clone(),
                config.upload_size_bytes,
                config.download_timeout(),
            )?)),
        };

        Ok(Self {
            ping: Arc::new(SystemPing::new(config.ping_count, config.ping_timeout())),
            download: Arc::new(HttpDownloadProber::new(config.download_timeout())?),
            upload,
        })
    }
}

/// User agent sent with every probe request
pub(crate) fn user_agent() -> String {
    format!("{}/{}", crate::PKG_NAME, crate::VERSION)
}
