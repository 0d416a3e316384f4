//! Upload figure: a local simulation or a real HTTP upload
//!
//! The simulation times an in-memory buffer duplication. It does not touch
//! the network and is always presented as "local simulation".

use super::{user_agent, UploadProber};
use crate::{
    defaults,
    error::{AppError, Result},
    models::{compute_throughput, Sample},
    types::ThroughputUnit,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Scale and clamp a raw duplication rate into the simulated upload figure
pub fn simulated_figure(bytes: u64, elapsed: Duration, unit: ThroughputUnit) -> Option<f64> {
    compute_throughput(bytes, elapsed, unit)
        .map(|raw| (raw * defaults::SIMULATED_UPLOAD_SCALE).min(defaults::SIMULATED_UPLOAD_CEILING))
}

/// Local buffer-duplication timing
#[derive(Debug, Clone)]
pub struct SimulatedUpload {
    size: usize,
}

impl SimulatedUpload {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

#[async_trait]
impl UploadProber for SimulatedUpload {
    fn target(&self) -> String {
        "local buffer".to_string()
    }

    async fn upload(&self, unit: ThroughputUnit) -> Result<Sample> {
        let buffer = vec![b'A'; self.size];

        let start = Instant::now();
        let duplicated = std::hint::black_box(buffer.repeat(2));
        let elapsed = start.elapsed();

        let bytes = duplicated.len() as u64;
        let value = simulated_figure(bytes, elapsed, unit)
            .ok_or_else(|| AppError::statistics("Upload simulation finished in zero elapsed time"))?;

        Ok(Sample { value, bytes, elapsed })
    }
}

/// POSTs a bounded payload to an endpoint and times the request
#[derive(Debug, Clone)]
pub struct HttpUploadProber {
    client: Client,
    url: String,
    size: usize,
}

impl HttpUploadProber {
    pub fn new(url: String, size: usize, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url, size })
    }

    fn payload(&self) -> Vec<u8> {
        (0..self.size).map(|i| (i % 256) as u8).collect()
    }
}

#[async_trait]
impl UploadProber for HttpUploadProber {
    fn target(&self) -> String {
        self.url.clone()
    }

    async fn upload(&self, unit: ThroughputUnit) -> Result<Sample> {
        let payload = self.payload();
        let bytes = payload.len() as u64;

        let start = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(payload)
            .send()
            .await?
            .error_for_status()?;
        response.bytes().await?;
        let elapsed = start.elapsed();

        Sample::from_transfer(bytes, elapsed, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[test]
    fn test_simulated_figure_scales_by_tenth() {
        // 2 MiB in one second is 16 Mbit/s raw
        let value = simulated_figure(2_097_152, Duration::from_secs(1), ThroughputUnit::Bits).unwrap();
        assert!((value - 1.6).abs() < 1e-12);

        let value = simulated_figure(2_097_152, Duration::from_secs(1), ThroughputUnit::Bytes).unwrap();
        assert!((value - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_simulated_figure_is_clamped() {
        let value = simulated_figure(2_097_152, Duration::from_micros(10), ThroughputUnit::Bits).unwrap();
        assert_eq!(value, 50.0);
    }

    #[test]
    fn test_simulated_figure_zero_elapsed() {
        assert_eq!(simulated_figure(2_097_152, Duration::ZERO, ThroughputUnit::Bits), None);
    }

    #[tokio::test]
    async fn test_simulated_upload_bounds() {
        let upload = SimulatedUpload::new(defaults::DEFAULT_UPLOAD_SIZE);
        assert_eq!(upload.target(), "local buffer");

        // A duplication too fast for the clock is a failed iteration, not a zero
        match upload.upload(ThroughputUnit::Bits).await {
            Ok(sample) => {
                assert_eq!(sample.bytes, 2 * defaults::DEFAULT_UPLOAD_SIZE as u64);
                assert!(sample.value > 0.0);
                assert!(sample.value <= defaults::SIMULATED_UPLOAD_CEILING);
            }
            Err(error) => assert_eq!(error.category(), "STATS"),
        }
    }

    #[tokio::test]
    async fn test_http_upload_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(20)))
            .expect(1)
            .mount(&server)
            .await;

        let prober = HttpUploadProber::new(format!("{}/upload", server.uri()), 65_536, Duration::from_secs(5)).unwrap();
        let sample = prober.upload(ThroughputUnit::Bits).await.unwrap();

        assert_eq!(sample.bytes, 65_536);
        assert!(sample.value > 0.0);

        let received = server.received_requests().await.unwrap();
        assert_eq!(received[0].body.len(), 65_536);
        assert_eq!(received[0].body[255], 255);
    }

    #[tokio::test]
    async fn test_http_upload_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let prober = HttpUploadProber::new(format!("{}/upload", server.uri()), 1024, Duration::from_secs(5)).unwrap();
        let error = prober.upload(ThroughputUnit::Bits).await.unwrap_err();
        assert_eq!(error.category(), "HTTP");
    }
}
