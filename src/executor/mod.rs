//! Sequential speed test session runner
//!
//! Runs ping, then every download target in order, then the upload
//! iterations, one probe in flight at a time. Probe-local failures are
//! recorded as failed outcomes and never abort the run; only a mandatory
//! download metric with no successful samples is fatal.

use crate::{
    error::{AppError, Result},
    logging::{Logger, ProbeLogger},
    models::{display_host, Config, ProbeKind, ProbeOutcome, SpeedtestReport},
    probe::{ProbeSet, UploadProber},
    stats::Aggregator,
    types::ConnectionQuality,
};
use chrono::{Local, Utc};
use std::sync::Arc;
use std::time::Instant;

/// Width of the separator line under the run banner
const SEPARATOR_WIDTH: usize = 50;

/// Receives human-readable progress lines while a session runs
pub trait ProgressSink: Send + Sync {
    fn line(&self, text: &str);
}

/// Prints progress lines to stdout
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn line(&self, text: &str) {
        println!("{}", text);
    }
}

/// Discards progress lines (machine-readable output modes)
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn line(&self, _text: &str) {}
}

/// Collects progress lines in memory
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingProgress {
    lines: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingProgress {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ProgressSink for RecordingProgress {
    fn line(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}

/// Drives one speed test session
pub struct SpeedtestExecutor {
    config: Config,
    probes: ProbeSet,
    progress: Arc<dyn ProgressSink>,
    logger: Logger,
    probe_logger: ProbeLogger,
}

impl SpeedtestExecutor {
    pub fn new(config: Config, probes: ProbeSet, progress: Arc<dyn ProgressSink>, logger: &Logger) -> Self {
        let logger = logger.child("EXECUTOR");
        Self {
            probe_logger: ProbeLogger::new(logger.child("PROBE")),
            config,
            probes,
            progress,
            logger,
        }
    }

    /// Run only the ping probe; failure is returned to the caller
    pub async fn run_ping(&self) -> Result<f64> {
        let host = self
            .config
            .ping_host
            .as_deref()
            .ok_or_else(|| AppError::config("No ping host configured"))?;

        let mut probes = Vec::new();
        self.probe_ping(host, &mut probes).await
    }

    /// Run the full session and build the report
    pub async fn run(&self) -> Result<SpeedtestReport> {
        let started_at = Utc::now();
        let unit = self.config.unit;
        let mut probes = Vec::new();

        self.logger
            .info("Speed test started")
            .field("profile", self.config.profile)
            .field("unit", unit)
            .field("targets", self.config.download_urls.len())
            .log()
            .await;

        self.progress.line("🚀 Starting Niu-Speedtest...");
        self.progress.line(&format!(
            "Started at: {}",
            started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ));
        self.progress.line(&"=".repeat(SEPARATOR_WIDTH));

        let (ping_ms, ping_error) = match self.config.ping_host.as_deref() {
            None => (None, None),
            Some(host) => {
                self.progress.line("📡 Testing ping...");
                match self.probe_ping(host, &mut probes).await {
                    Ok(ms) => {
                        self.progress.line(&format!("   Ping: {:.2} ms", ms));
                        (Some(ms), None)
                    }
                    Err(e) => {
                        self.progress.line(&format!("   Ping: unavailable ({})", e));
                        (None, Some(e.to_string()))
                    }
                }
            }
        };

        self.progress.line("⬇️  Testing download speed...");
        let total = self.config.download_urls.len();
        for (index, url) in self.config.download_urls.iter().enumerate() {
            self.progress
                .line(&format!("   Test {}/{}: {}", index + 1, total, display_host(url)));

            let outcome = self.probe_download(url).await;
            match (&outcome.value, &outcome.error) {
                (Some(value), _) => self.progress.line(&format!("      Speed: {:.2} {}", value, unit.label())),
                (None, error) => self
                    .progress
                    .line(&format!("      Failed: {}", error.as_deref().unwrap_or("unknown error"))),
            }
            probes.push(outcome);
        }

        let download_samples = Aggregator::samples(&probes, ProbeKind::Download);
        let download = if self.config.download_mandatory() {
            match Aggregator::mandatory(&download_samples) {
                Ok(summary) => summary,
                Err(e) => {
                    self.probe_logger.log_error(&e, "Download measurement").await;
                    return Err(e);
                }
            }
        } else {
            Aggregator::optional(&download_samples)
        };

        let upload = match &self.probes.upload {
            None => None,
            Some(prober) => {
                self.progress.line(&format!(
                    "⬆️  Testing upload speed ({})...",
                    self.config.upload.description()
                ));
                for iteration in 1..=self.config.upload_iterations {
                    let outcome = self.probe_upload(prober.as_ref()).await;
                    match (&outcome.value, &outcome.error) {
                        (Some(value), _) => self.progress.line(&format!(
                            "   Upload test {}/{}: {:.2} {}",
                            iteration,
                            self.config.upload_iterations,
                            value,
                            unit.label()
                        )),
                        (None, error) => self.progress.line(&format!(
                            "   Upload test {}/{}: Failed: {}",
                            iteration,
                            self.config.upload_iterations,
                            error.as_deref().unwrap_or("unknown error")
                        )),
                    }
                    probes.push(outcome);
                }
                Some(Aggregator::optional(&Aggregator::samples(&probes, ProbeKind::Upload)))
            }
        };

        let report = SpeedtestReport {
            profile: self.config.profile,
            unit,
            ping_ms,
            ping_error,
            quality: ConnectionQuality::classify(download.mean),
            download,
            upload,
            upload_mode: self.config.upload.clone(),
            probes,
            started_at,
            completed_at: Utc::now(),
        };

        self.logger
            .info("Speed test completed")
            .field("download_mean", report.download.mean)
            .field("download_failures", report.failure_count(ProbeKind::Download))
            .field("quality", report.quality)
            .field("duration_ms", report.duration().as_millis() as u64)
            .log()
            .await;

        Ok(report)
    }

    async fn probe_ping(&self, host: &str, probes: &mut Vec<ProbeOutcome>) -> Result<f64> {
        let start = Instant::now();
        let result = self.probes.ping.ping(host).await;
        let outcome = match &result {
            Ok(ms) => ProbeOutcome::success(ProbeKind::Ping, host, *ms, 0, start.elapsed()),
            Err(e) => ProbeOutcome::failed(ProbeKind::Ping, host, e, start.elapsed()),
        };

        self.probe_logger.log_outcome(&outcome).await;
        probes.push(outcome);
        result
    }

    async fn probe_download(&self, url: &str) -> ProbeOutcome {
        let start = Instant::now();
        let outcome = match self.probes.download.download(url, self.config.unit).await {
            Ok(sample) => ProbeOutcome::from_sample(ProbeKind::Download, url, &sample),
            Err(e) => ProbeOutcome::failed(ProbeKind::Download, url, &e, start.elapsed()),
        };

        self.probe_logger.log_outcome(&outcome).await;
        outcome
    }

    async fn probe_upload(&self, prober: &dyn UploadProber) -> ProbeOutcome {
        let start = Instant::now();
        let outcome = match prober.upload(self.config.unit).await {
            Ok(sample) => ProbeOutcome::from_sample(ProbeKind::Upload, prober.target(), &sample),
            Err(e) => ProbeOutcome::failed(ProbeKind::Upload, prober.target(), &e, start.elapsed()),
        };

        self.probe_logger.log_outcome(&outcome).await;
        outcome
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    use crate::{
        error::{AppError, Result},
        models::Sample,
        probe::{DownloadProber, PingProber, ProbeSet, UploadProber},
        types::ThroughputUnit,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Ping prober with a fixed answer; `None` fails
    pub struct MockPing(pub Option<f64>);

    #[async_trait]
    impl PingProber for MockPing {
        async fn ping(&self, host: &str) -> Result<f64> {
            self.0
                .ok_or_else(|| AppError::ping(format!("ping {} exited with exit status: 1", host)))
        }
    }

    /// Download prober answering per URL; unknown URLs fail with 404
    pub struct MockDownload(pub HashMap<String, f64>);

    impl MockDownload {
        pub fn new(entries: &[(&str, f64)]) -> Self {
            Self(entries.iter().map(|(url, value)| (url.to_string(), *value)).collect())
        }
    }

    #[async_trait]
    impl DownloadProber for MockDownload {
        async fn download(&self, url: &str, _unit: ThroughputUnit) -> Result<Sample> {
            self.0
                .get(url)
                .map(|value| Sample {
                    value: *value,
                    bytes: 1_048_576,
                    elapsed: Duration::from_millis(100),
                })
                .ok_or_else(|| AppError::http_request(format!("HTTP status 404 Not Found for url ({})", url)))
        }
    }

    /// Upload prober returning queued values in order; `None` entries fail
    pub struct MockUpload {
        values: Vec<Option<f64>>,
        calls: AtomicUsize,
    }

    impl MockUpload {
        pub fn new(values: Vec<Option<f64>>) -> Self {
            Self {
                values,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl UploadProber for MockUpload {
        fn target(&self) -> String {
            "local buffer".to_string()
        }

        async fn upload(&self, _unit: ThroughputUnit) -> Result<Sample> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.values.get(call).copied().flatten() {
                Some(value) => Ok(Sample {
                    value,
                    bytes: 2_097_152,
                    elapsed: Duration::from_millis(1),
                }),
                None => Err(AppError::statistics("Upload simulation finished in zero elapsed time")),
            }
        }
    }

    pub fn probe_set(ping: Option<f64>, downloads: &[(&str, f64)], upload: Option<Vec<Option<f64>>>) -> ProbeSet {
        ProbeSet {
            ping: Arc::new(MockPing(ping)),
            download: Arc::new(MockDownload::new(downloads)),
            upload: upload.map(|values| Arc::new(MockUpload::new(values)) as Arc<dyn UploadProber>),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::probe_set;
    use super::*;
    use crate::types::{Profile, UploadMode};

    fn config(profile: Profile, urls: &[&str]) -> Config {
        let mut config = Config::for_profile(profile);
        config.download_urls = urls.iter().map(|u| u.to_string()).collect();
        config
    }

    fn executor(config: Config, probes: ProbeSet) -> (SpeedtestExecutor, Arc<RecordingProgress>) {
        let progress = Arc::new(RecordingProgress::default());
        let executor = SpeedtestExecutor::new(config, probes, progress.clone(), &Logger::new("TEST"));
        (executor, progress)
    }

    #[tokio::test]
    async fn test_standard_run_aggregates_all_metrics() {
        let urls = ["http://a.example/1MB.zip", "http://b.example/10MB.zip"];
        let probes = probe_set(
            Some(12.34),
            &[(urls[0], 10.0), (urls[1], 30.0)],
            Some(vec![Some(4.0), Some(6.0)]),
        );
        let (executor, progress) = executor(config(Profile::Standard, &urls), probes);

        let report = executor.run().await.unwrap();

        assert_eq!(report.ping_ms, Some(12.34));
        assert!(report.ping_error.is_none());
        assert_eq!(report.download.mean, 20.0);
        assert_eq!(report.download.median, 20.0);
        assert_eq!(report.download.count, 2);
        assert_eq!(report.upload.unwrap().mean, 5.0);
        assert_eq!(report.quality, ConnectionQuality::Fair);
        assert_eq!(report.probes.len(), 5);
        assert_eq!(report.upload_mode, UploadMode::Simulated);

        let lines = progress.lines();
        assert!(lines.contains(&"   Test 1/2: a.example".to_string()));
        assert!(lines.contains(&"      Speed: 30.00 Mbps".to_string()));
        assert!(lines.iter().any(|l| l.contains("local simulation")));
    }

    #[tokio::test]
    async fn test_failed_download_excluded_not_zero() {
        let urls = ["http://a.example/1MB.zip", "http://b.example/10MB.zip"];
        let probes = probe_set(Some(5.0), &[(urls[1], 40.0)], None);
        let (executor, progress) = executor(config(Profile::Standard, &urls), probes);

        let report = executor.run().await.unwrap();

        assert_eq!(report.download.mean, 40.0);
        assert_eq!(report.download.count, 1);
        assert_eq!(report.failure_count(ProbeKind::Download), 1);
        assert!(report.upload.is_none());
        assert!(progress.lines().iter().any(|l| l.starts_with("      Failed:") && l.contains("404")));
    }

    #[tokio::test]
    async fn test_standard_all_downloads_failed_is_zero() {
        let urls = ["http://a.example/1MB.zip"];
        let probes = probe_set(Some(5.0), &[], Some(vec![None, Some(3.0)]));
        let (executor, _) = executor(config(Profile::Standard, &urls), probes);

        let report = executor.run().await.unwrap();

        assert!(report.download.is_empty());
        assert_eq!(report.download.mean, 0.0);
        assert_eq!(report.quality, ConnectionQuality::Poor);
        let upload = report.upload.unwrap();
        assert_eq!(upload.count, 1);
        assert_eq!(upload.mean, 3.0);
        assert_eq!(report.failure_count(ProbeKind::Upload), 1);
    }

    #[tokio::test]
    async fn test_detailed_all_downloads_failed_is_fatal() {
        let urls = ["http://a.example/1MB.zip", "http://b.example/10MB.zip"];
        let probes = probe_set(Some(5.0), &[], None);
        let (executor, progress) = executor(config(Profile::Detailed, &urls), probes);

        let error = executor.run().await.unwrap_err();

        assert_eq!(error.category(), "TEST");
        assert!(error.to_string().contains("All speed tests failed!"));
        let lines = progress.lines();
        assert_eq!(lines.iter().filter(|l| l.starts_with("      Failed:")).count(), 2);
        assert!(!lines.iter().any(|l| l.contains("upload")));
    }

    #[tokio::test]
    async fn test_ping_failure_does_not_abort_run() {
        let urls = ["http://a.example/1MB.zip"];
        let probes = probe_set(None, &[(urls[0], 60.0)], None);
        let (executor, progress) = executor(config(Profile::Detailed, &urls), probes);

        let report = executor.run().await.unwrap();

        assert_eq!(report.ping_ms, None);
        assert!(report.ping_error.as_deref().unwrap().contains("exit status"));
        assert_eq!(report.failure_count(ProbeKind::Ping), 1);
        assert_eq!(report.quality, ConnectionQuality::Excellent);
        assert!(progress.lines().iter().any(|l| l.starts_with("   Ping: unavailable")));
    }

    #[tokio::test]
    async fn test_no_ping_host_skips_probe() {
        let urls = ["http://a.example/1MB.zip"];
        let mut config = config(Profile::Standard, &urls);
        config.ping_host = None;
        let (executor, progress) = executor(config, probe_set(Some(1.0), &[(urls[0], 1.0)], None));

        let report = executor.run().await.unwrap();

        assert_eq!(report.ping_ms, None);
        assert_eq!(report.ping_error, None);
        assert_eq!(report.outcomes(ProbeKind::Ping).count(), 0);
        assert!(!progress.lines().iter().any(|l| l.contains("Testing ping")));
    }

    #[tokio::test]
    async fn test_run_ping() {
        let (runner, progress) = executor(Config::default(), probe_set(Some(12.34), &[], None));
        assert_eq!(runner.run_ping().await.unwrap(), 12.34);
        assert!(progress.lines().is_empty());

        let (failing, _) = executor(Config::default(), probe_set(None, &[], None));
        let error = failing.run_ping().await.unwrap_err();
        assert_eq!(error.category(), "PING");
    }

    #[tokio::test]
    async fn test_run_ping_without_host() {
        let mut config = Config::default();
        config.ping_host = None;
        let (executor, _) = executor(config, probe_set(Some(1.0), &[], None));
        assert_eq!(executor.run_ping().await.unwrap_err().category(), "CONFIG");
    }

    #[tokio::test]
    async fn test_bytes_unit_label() {
        let urls = ["http://a.example/1MB.zip"];
        let mut config = config(Profile::Standard, &urls);
        config.unit = crate::types::ThroughputUnit::Bytes;
        let (executor, progress) = executor(config, probe_set(Some(1.0), &[(urls[0], 1.5)], None));

        executor.run().await.unwrap();
        assert!(progress.lines().contains(&"      Speed: 1.50 MB/s".to_string()));
    }
}
