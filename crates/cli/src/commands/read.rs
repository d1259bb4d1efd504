//! `read` command implementation.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use contracts::CaptureConfig;
use tracing::{info, warn};

use crate::cli::ReadArgs;
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Session directory name under the base directory (local start time)
pub const SESSION_DIR_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Execute the `read` command
pub async fn run_read(args: &ReadArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    apply_overrides(&mut config, args);
    config_loader::validate(&config)?;

    let capture_dir = args
        .directory
        .join(Local::now().format(SESSION_DIR_FORMAT).to_string());
    info!(
        dir = %capture_dir.display(),
        bind = %config.capture.socket_addr(),
        "Configuration loaded"
    );

    let mut pipeline_config = PipelineConfig::new(config, capture_dir);
    pipeline_config.duration = args.duration.map(Duration::from_secs);

    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Capture failed")?;

    stats.print_summary();
    info!(
        persisted = stats.persist.persisted,
        dropped = stats.ingestion.packets_dropped,
        "XT-32 capture finished"
    );
    Ok(())
}

/// CLI flags win over file values
fn apply_overrides(config: &mut CaptureConfig, args: &ReadArgs) {
    if let Some(port) = args.port {
        info!(port, "Overriding capture port from CLI");
        config.capture.port = port;
    }
    if let Some(ref bind) = args.bind {
        info!(bind = %bind, "Overriding bind address from CLI");
        config.capture.bind_address = bind.clone();
    }
    if let Some(capacity) = args.queue_capacity {
        config.queue.capacity = capacity;
    }
    if let Some(policy) = args.backpressure {
        config.queue.backpressure = policy.into();
    }
    if let Some(packets) = args.packets_per_file {
        config.persist.packets_per_file = packets;
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
