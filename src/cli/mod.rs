//! Command-line interface definition

use crate::types::{OutputMode, Profile, ThroughputUnit};
use clap::{ArgAction, Parser};

const EXAMPLES: &str = "\
Examples:
  niu-speedtest                          Run a speed test
  niu-speedtest --ping-only              Only measure ping latency
  niu-speedtest --ping-only --simple     Print the bare ping value
  niu-speedtest --simple                 Print download,upload,ping
  niu-speedtest --detailed               Probe all mirrors with full statistics
  niu-speedtest --json --unit bytes      JSON report in megabytes per second
  niu-speedtest --upload-url URL         Measure upload with a real HTTP POST

The default upload figure is a local simulation, not a network measurement.";

/// Niu-Speedtest - ping latency, download throughput and upload estimation
#[derive(Parser, Debug, Clone)]
#[command(name = "niu-speedtest")]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Only measure ping latency
    #[arg(long)]
    pub ping_only: bool,

    /// Machine-readable output: download,upload,ping (or the bare ping value)
    #[arg(long, conflicts_with = "json")]
    pub simple: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Probe every mirror and report mean/median/min/max; fails if all downloads fail
    #[arg(long)]
    pub detailed: bool,

    /// Throughput unit: bits (Mbps) or bytes (MB/s)
    #[arg(long, value_name = "UNIT", value_parser = parse_unit)]
    pub unit: Option<ThroughputUnit>,

    /// Download URL to probe (can be used multiple times; replaces the default mirrors)
    #[arg(long = "url", value_name = "URL", action = ArgAction::Append)]
    pub urls: Vec<String>,

    /// Host to ping
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Echo requests sent by the ping probe
    #[arg(long, value_name = "N")]
    pub ping_count: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_name = "SECS", value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Skip the ping probe
    #[arg(long)]
    pub no_ping: bool,

    /// Include the upload figure
    #[arg(long, conflicts_with = "no_upload")]
    pub upload: bool,

    /// Skip the upload figure
    #[arg(long)]
    pub no_upload: bool,

    /// Measure upload by POSTing a payload to this URL instead of simulating
    #[arg(long, value_name = "URL", conflicts_with = "no_upload")]
    pub upload_url: Option<String>,

    /// Upload payload size in bytes
    #[arg(long, value_name = "BYTES")]
    pub upload_size: Option<usize>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print version information
    #[arg(short = 'v', long = "version")]
    pub version: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts clap does not express
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        Ok(())
    }

    /// Profile selected by the flags
    pub fn profile(&self) -> Profile {
        if self.detailed {
            Profile::Detailed
        } else {
            Profile::Standard
        }
    }

    /// Output mode selected by the flags
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.simple {
            OutputMode::Simple
        } else {
            OutputMode::Report
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Version banner printed by `--version`
pub fn version_banner() -> String {
    format!(
        "{} version {}\n{}\nCommit: {} (built {})\nTarget: {}",
        crate::PKG_NAME,
        crate::VERSION,
        crate::PKG_DESCRIPTION,
        env!("GIT_COMMIT"),
        env!("BUILD_TIME"),
        env!("TARGET_TRIPLE")
    )
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

fn parse_unit(s: &str) -> Result<ThroughputUnit, String> {
    s.parse::<ThroughputUnit>().map_err(|e| e.to_string())
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
