//! # logreplay CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration merge (config file + flags) and validation
//! - Replay session orchestration
//! - Exit code 0 on clean end-of-log, 1 on any fatal error

mod cli;
mod error;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::Layer;

use cli::Cli;

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    if cli.metrics_port != 0 {
        observability::init_metrics_only(cli.metrics_port)?;
    }

    info!(version = env!("CARGO_PKG_VERSION"), "logreplay starting");

    let result = session::run(&cli);

    if let Err(ref e) = result {
        tracing::error!(error = %e, "replay failed");
    }

    result.map(|_| ()).map_err(Into::into)
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else {
        let default_level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let fmt_layer = match cli.log_format {
        cli::LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        cli::LogFormat::Pretty => fmt::layer().pretty().boxed(),
        cli::LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
