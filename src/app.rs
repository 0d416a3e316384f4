//! Main application orchestration and execution

use crate::{
    config::display_config_summary,
    error::Result,
    executor::{ConsoleProgress, ProgressSink, SilentProgress, SpeedtestExecutor},
    logging::Logger,
    models::Config,
    output::{OutputFormatterFactory, ReportFormatter},
    probe::ProbeSet,
};
use std::sync::Arc;

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    executor: SpeedtestExecutor,
    formatter: Box<dyn ReportFormatter>,
    logger: Logger,
}

impl App {
    /// Create an application backed by the real network probes
    pub fn new(config: Config) -> Result<Self> {
        let probes = ProbeSet::from_config(&config)?;
        let progress: Arc<dyn ProgressSink> = if config.output.shows_progress() && !config.ping_only {
            Arc::new(ConsoleProgress)
        } else {
            Arc::new(SilentProgress)
        };

        Ok(Self::with_probes(config, probes, progress))
    }

    /// Create an application with explicit probes and progress sink
    pub fn with_probes(config: Config, probes: ProbeSet, progress: Arc<dyn ProgressSink>) -> Self {
        let logger = Logger::with_config("APP", &config);
        let formatter = OutputFormatterFactory::for_config(&config);
        let executor = SpeedtestExecutor::new(config.clone(), probes, progress, &logger);

        Self {
            config,
            executor,
            formatter,
            logger,
        }
    }

    /// Run the application and return the final output text
    pub async fn run(&self) -> Result<String> {
        let session_id = self.logger.start_session().await;
        self.logger.add_context_field("profile", self.config.profile).await;

        self.logger
            .debug("Configuration loaded")
            .field("session", &session_id)
            .field("summary", display_config_summary(&self.config))
            .log()
            .await;

        if self.config.ping_only {
            let ping_ms = self.executor.run_ping().await?;
            return self.formatter.format_ping(ping_ms);
        }

        let report = self.executor.run().await?;
        self.formatter.format_report(&report)
    }
}
