//! castwatch - quota-aware media playback orchestrator.
//!
//! Runs as one of two long-lived processes (`worker`, `serve`) plus a
//! `maintenance` subcommand for one-shot operator recovery actions.

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;

mod cli;
mod config;
mod logging;
mod setup;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _guards = match logging::init_logging(&cli.log_dir, cli.verbose) {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    let castwatch_config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Worker => cli::worker::run(castwatch_config).await.map(|code| {
            if code == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }),
        Commands::Serve { bind } => cli::serve::run(castwatch_config, bind)
            .await
            .map(|()| ExitCode::SUCCESS),
        Commands::Maintenance(command) => cli::maintenance::run(castwatch_config, command)
            .await
            .map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}
