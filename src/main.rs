//! Niu-Speedtest - Main CLI Application
//!
//! Measures ping latency, download throughput and an upload figure, then
//! prints a report, a comma-separated line or a JSON document.

use clap::Parser;
use niu_speedtest::{
    app::App,
    cli::{version_banner, Cli},
    config::load_config,
    error::{AppError, ErrorReporter, Result},
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(AppError::internal("panic").exit_code());
    }));

    // Parse command line arguments; clap exits non-zero on unknown arguments
    let cli = Cli::parse();

    if cli.version {
        println!("{}", version_banner());
        return;
    }

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    let result = tokio::select! {
        result = run_application(cli) => result,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => Err(AppError::cancelled("Speedtest cancelled by user")),
            Err(e) => Err(AppError::internal(format!("Failed to listen for Ctrl-C: {}", e))),
        },
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            if matches!(e, AppError::Cancelled(_)) {
                eprintln!("\n\n⚠️  Speedtest cancelled by user");
            } else {
                reporter.report_error(&e);
            }
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<String> {
    let config = load_config(cli)?;
    let app = App::new(config)?;
    app.run().await
}
