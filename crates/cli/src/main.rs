//! # XT-32 Capture CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - `read`: live UDP capture into rotating raw files
//! - `unpack`: offline conversion of raw files into frame files
//! - Structured exit codes (see [`error::exit`])

mod cli;
mod commands;
mod error;
mod pipeline;

use std::process::ExitCode;

use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_read, run_unpack};
use error::exit;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(exit::USAGE)
            } else {
                ExitCode::from(exit::SUCCESS)
            };
        }
    };

    let mut observability_config =
        ObservabilityConfig::from_verbosity(cli.verbose, cli.quiet, cli.log_format.into());
    observability_config.metrics_port = (cli.metrics_port != 0).then_some(cli.metrics_port);
    if let Err(e) = observability::init_with_config(observability_config) {
        eprintln!("error: {e:#}");
        return ExitCode::from(exit::FAILURE);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "XT-32 capture starting"
    );

    let config_path = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Read(args) => run_read(args, config_path).await,
        Commands::Unpack(args) => run_unpack(args, config_path).await,
    };

    match result {
        Ok(()) => ExitCode::from(exit::SUCCESS),
        Err(e) => {
            let code = e.exit_code();
            tracing::error!(
                error = format!("{e:#}"),
                class = ?e.class(),
                exit_code = code,
                "Command failed"
            );
            eprintln!("error: {e:#}");
            ExitCode::from(code)
        }
    }
}
