use anyhow::Result;
use authfetch_core::tracing::{config::InstrumentationConfig, init::init_tracing};
use authfetch_daemon::{DaemonError, Settings, commands::Commands};
use clap::Parser;
use std::{path::PathBuf, process::ExitCode};
use tracing::debug;

/// authfetch - mock JWT auth server and refreshing client
#[derive(Parser, Debug)]
#[command(name = "authfetch", author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = Settings::load(cli.config.as_deref())?;

    let instrumentation_config = InstrumentationConfig {
        service_name: "authfetch".to_string(),
        service_version: env!("CARGO_PKG_VERSION").to_string(),
        log_level: settings.logging.level.clone(),
        json: settings.logging.json,
    };
    init_tracing(&instrumentation_config)?;
    debug!(config = ?cli.config, "Settings loaded");

    match cli.command.execute(settings).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // The console observer has already printed the reason
        Err(DaemonError::Login(_)) => Ok(ExitCode::FAILURE),
        Err(e) => Err(e.into()),
    }
}
