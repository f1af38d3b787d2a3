//! # Settle Up CLI
//!
//! Account client for the Settle Up API: sign in, register, verify email,
//! and manage the stored session.

use std::process::ExitCode;

use clap::Parser;

mod commands;
mod config;
mod state;
mod telemetry;

use commands::Cli;
use config::AppConfig;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_telemetry(&TelemetryConfig::from_env(cli.verbose));

    let config = AppConfig::from_env();
    tracing::debug!(storage = ?config.storage, "Configuration loaded");

    let state = match AppState::new(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start");
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = commands::run(cli.command, &state).await;
    state.shutdown().await;
    code
}
