//! Configuration parsing from CLI arguments

use crate::{
    cli::Cli,
    error::{AppError, Result},
    models::Config,
    types::UploadMode,
};

/// Configuration parser that applies CLI arguments on top of a profile preset
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::config)?;

        // Start from the preset of the selected profile
        let mut config = Config::for_profile(self.cli.profile());

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(unit) = self.cli.unit {
            config.unit = unit;
        }

        if !self.cli.urls.is_empty() {
            config.download_urls = self.cli.urls.clone();
        }

        if let Some(ref host) = self.cli.host {
            config.ping_host = Some(host.clone());
        }
        if self.cli.no_ping {
            config.ping_host = None;
        }

        if let Some(count) = self.cli.ping_count {
            config.ping_count = count;
        }

        if let Some(timeout) = self.cli.timeout {
            config.download_timeout_seconds = timeout;
        }

        if let Some(ref url) = self.cli.upload_url {
            config.upload = UploadMode::Http { url: url.clone() };
        } else if self.cli.upload {
            config.upload = UploadMode::Simulated;
        } else if self.cli.no_upload {
            config.upload = UploadMode::Disabled;
        }

        if let Some(size) = self.cli.upload_size {
            config.upload_size_bytes = size;
        }

        config.ping_only = self.cli.ping_only;
        config.output = self.cli.output_mode();
        config.enable_color = self.cli.use_colors();

        // Set verbose and debug flags (these are CLI-only)
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    let parser = ConfigParser::new(cli);
    parser.parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Profile: {}", config.profile));
    summary.push(format!("Ping Host: {}", config.ping_host.as_deref().unwrap_or("(skipped)")));
    summary.push(format!("Ping Count: {}", config.ping_count));
    summary.push(format!("Download URLs: {}", config.download_urls.join(", ")));
    summary.push(format!("Timeout: {}s", config.download_timeout_seconds));
    summary.push(format!("Unit: {} ({})", config.unit, config.unit.label()));
    summary.push(format!("Upload: {}", config.upload.description()));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
