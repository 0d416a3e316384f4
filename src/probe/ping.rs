//! Latency probe backed by the system ping utility

use super::PingProber;
use crate::error::{AppError, ErrorContext, Result};
use async_trait::async_trait;
use regex::Regex;
use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;

/// `min/avg/max/... = a/b/c/...` summary printed by Unix ping implementations
static SUMMARY_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(?P<labels>[A-Za-z]+(?:/[A-Za-z]+)+)\s*=\s*(?P<values>\d+(?:\.\d+)?(?:/\d+(?:\.\d+)?)+)")
});

/// `Average = Nms` summary printed by Windows ping
static WINDOWS_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"Average\s*=\s*(?P<avg>\d+(?:\.\d+)?)\s*ms"));

/// Runs `ping` as a subprocess and parses the summary line
#[derive(Debug, Clone)]
pub struct SystemPing {
    program: String,
    count: u32,
    timeout: Duration,
}

impl SystemPing {
    pub fn new(count: u32, timeout: Duration) -> Self {
        Self {
            program: "ping".to_string(),
            count,
            timeout,
        }
    }

    /// Use a different executable in place of `ping`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn args(&self, host: &str) -> Vec<String> {
        let count_flag = if cfg!(windows) { "-n" } else { "-c" };
        vec![count_flag.to_string(), self.count.to_string(), host.to_string()]
    }
}

#[async_trait]
impl PingProber for SystemPing {
    async fn ping(&self, host: &str) -> Result<f64> {
        let mut command = Command::new(&self.program);
        command
            .args(self.args(host))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => {
                return Err(AppError::ping(format!(
                    "ping {} did not finish within {}s",
                    host,
                    self.timeout.as_secs()
                )))
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::ping(format!("'{}' utility not found", self.program)))
            }
            Ok(Err(e)) => return Err(AppError::ping(format!("Failed to run '{}': {}", self.program, e))),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(AppError::ping(if detail.is_empty() {
                format!("ping {} exited with {}", host, output.status)
            } else {
                format!("ping {} exited with {}: {}", host, output.status, detail)
            }));
        }

        parse_ping_average(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract the average round-trip time in milliseconds from ping output.
///
/// Recognizes `min/avg/max/... = a/b/c/... ms` summaries (the `avg` field is
/// located by label) and the Windows `Average = Nms` form.
pub fn parse_ping_average(output: &str) -> Result<f64> {
    let summary = SUMMARY_PATTERN
        .as_ref()
        .map_err(|e| AppError::internal(format!("Invalid ping summary pattern: {}", e)))?;

    for caps in summary.captures_iter(output) {
        let labels: Vec<&str> = caps["labels"].split('/').collect();
        let values: Vec<&str> = caps["values"].split('/').collect();
        if labels.len() != values.len() {
            continue;
        }

        if let Some(index) = labels.iter().position(|label| label.eq_ignore_ascii_case("avg")) {
            return values[index]
                .parse::<f64>()
                .with_context(|| format!("Invalid average round-trip time '{}'", values[index]));
        }
    }

    let windows = WINDOWS_PATTERN
        .as_ref()
        .map_err(|e| AppError::internal(format!("Invalid ping average pattern: {}", e)))?;
    if let Some(caps) = windows.captures(output) {
        return caps["avg"]
            .parse::<f64>()
            .with_context(|| format!("Invalid average round-trip time '{}'", &caps["avg"]));
    }

    Err(AppError::ping("No average round-trip time found in ping output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_OUTPUT: &str = "\
PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.
64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=10.1 ms
64 bytes from 8.8.8.8: icmp_seq=2 ttl=117 time=40.2 ms

--- 8.8.8.8 ping statistics ---
4 packets transmitted, 4 received, 0% packet loss, time 3005ms
rtt min/avg/max/mdev = 10.1/23.456/40.2/5.0 ms
";

    #[test]
    fn test_parse_linux_summary() {
        assert_eq!(parse_ping_average(LINUX_OUTPUT).unwrap(), 23.456);
        assert_eq!(parse_ping_average("rtt min/avg/max/mdev = 10.1/23.456/40.2/5.0 ms").unwrap(), 23.456);
    }

    #[test]
    fn test_parse_macos_summary() {
        let output = "round-trip min/avg/max/stddev = 14.123/15.456/16.789/0.912 ms";
        assert_eq!(parse_ping_average(output).unwrap(), 15.456);
    }

    #[test]
    fn test_parse_busybox_summary() {
        let output = "round-trip min/avg/max = 9.870/10.113/10.356 ms";
        assert_eq!(parse_ping_average(output).unwrap(), 10.113);
    }

    #[test]
    fn test_parse_locates_avg_by_label() {
        let output = "rtt avg/min/max = 7.5/1.0/9.0 ms";
        assert_eq!(parse_ping_average(output).unwrap(), 7.5);
    }

    #[test]
    fn test_parse_windows_summary() {
        let output = "\
Ping statistics for 8.8.8.8:
    Packets: Sent = 4, Received = 4, Lost = 0 (0% loss),
Approximate round trip times in milli-seconds:
    Minimum = 11ms, Maximum = 14ms, Average = 12ms
";
        assert_eq!(parse_ping_average(output).unwrap(), 12.0);
    }

    #[test]
    fn test_parse_garbage_is_error() {
        let error = parse_ping_average("ping: unknown host nowhere.invalid").unwrap_err();
        assert_eq!(error.category(), "PING");

        assert!(parse_ping_average("").is_err());
        assert!(parse_ping_average("64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=10.1 ms").is_err());
    }

    #[test]
    fn test_parse_mismatched_fields_is_error() {
        assert!(parse_ping_average("rtt min/avg/max = 1.0/2.0 ms").is_err());
    }

    #[test]
    fn test_ping_args() {
        let ping = SystemPing::new(4, Duration::from_secs(10));
        let args = ping.args("8.8.8.8");
        assert_eq!(args.len(), 3);
        assert_eq!(args[1], "4");
        assert_eq!(args[2], "8.8.8.8");
    }

    #[tokio::test]
    async fn test_missing_program_is_ping_error() {
        let ping = SystemPing::new(1, Duration::from_secs(5)).with_program("niu-speedtest-no-such-ping");
        let error = ping.ping("8.8.8.8").await.unwrap_err();
        assert_eq!(error.category(), "PING");
        assert!(error.to_string().contains("not found"));
    }

    /// Write an executable shell script standing in for `ping`
    #[cfg(unix)]
    fn fake_ping(dir: &tempfile::TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("ping");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_ping_times_out() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_ping(&dir, "exec sleep 10");

        let ping = SystemPing::new(1, Duration::from_secs(1)).with_program(program);
        let error = ping.ping("8.8.8.8").await.unwrap_err();

        assert_eq!(error.category(), "PING");
        assert!(error.to_string().contains("did not finish within 1s"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_subprocess_output_is_parsed() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_ping(&dir, "echo 'rtt min/avg/max/mdev = 1.0/2.5/4.0/0.5 ms'");

        let ping = SystemPing::new(2, Duration::from_secs(5)).with_program(program);
        assert_eq!(ping.ping("8.8.8.8").await.unwrap(), 2.5);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_ping_reports_exit_status() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_ping(&dir, "echo 'ping: unknown host' >&2; exit 2");

        let ping = SystemPing::new(1, Duration::from_secs(5)).with_program(program);
        let error = ping.ping("nowhere.invalid").await.unwrap_err();

        assert_eq!(error.category(), "PING");
        assert!(error.to_string().contains("unknown host"));
    }
}
