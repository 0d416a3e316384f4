//! Download throughput probe

use super::{user_agent, DownloadProber};
use crate::{
    error::{AppError, ErrorContext, Result},
    models::{display_host, Sample},
    types::ThroughputUnit,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Downloads a whole file over HTTP and times the transfer
#[derive(Debug, Clone)]
pub struct HttpDownloadProber {
    client: Client,
}

impl HttpDownloadProber {
    /// Create a prober whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DownloadProber for HttpDownloadProber {
    async fn download(&self, url: &str, unit: ThroughputUnit) -> Result<Sample> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Download from {}", display_host(url)))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Reading body from {}", display_host(url)))?;
        let elapsed = start.elapsed();

        Sample::from_transfer(body.len() as u64, elapsed, unit)
    }
}
