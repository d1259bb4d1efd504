//! # Observability
//!
//! Tracing and Prometheus setup for the capture tool.
//!
//! ## Features
//!
//! - Tracing initialization (JSON / Pretty / Compact)
//! - Prometheus metrics export
//! - Capture counter sampling and run summaries
//!
//! ## Usage
//!
//! ```ignore
//! let mut config = ObservabilityConfig::from_verbosity(cli.verbose, cli.quiet, LogFormat::Json);
//! config.metrics_port = Some(9000);
//! observability::init_with_config(config)?;
//!
//! let mut aggregator = CaptureMetricsAggregator::new();
//! aggregator.update(sample);
//! println!("{}", aggregator.summary());
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::metrics::{
    record_capture_sample, CaptureMetricsAggregator, CaptureSample, CaptureSummary, RunningStats,
    StatsSummary,
};

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus listener port (None = disabled)
    pub metrics_port: Option<u16>,
    /// Filter directive used when `RUST_LOG` is unset
    pub default_log_level: String,
    /// Ignore `RUST_LOG` and use `default_log_level` as-is (quiet mode)
    pub ignore_env: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            metrics_port: None,
            default_log_level: "info".to_string(),
            ignore_env: false,
        }
    }
}

impl ObservabilityConfig {
    /// Level from `-v` count and `-q`
    pub fn from_verbosity(verbose: u8, quiet: bool, log_format: LogFormat) -> Self {
        let default_log_level = if quiet {
            "warn"
        } else {
            match verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        Self {
            log_format,
            default_log_level: default_log_level.to_string(),
            ignore_env: quiet,
            ..Default::default()
        }
    }

    fn env_filter(&self) -> EnvFilter {
        if self.ignore_env {
            return EnvFilter::new(&self.default_log_level);
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_log_level))
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human readable
    #[default]
    Pretty,
    /// Single line
    Compact,
    /// Structured JSON lines
    Json,
}

/// Install the tracing subscriber and, if configured, the Prometheus exporter
///
/// # Errors
/// Fails if a global subscriber or recorder is already installed, or the metrics port
/// cannot be bound.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        level = %config.default_log_level,
        metrics_port = ?config.metrics_port,
        "observability initialized"
    );
    Ok(())
}

/// Install only the Prometheus exporter (tracing already initialized elsewhere)
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .with_context(|| format!("Failed to install Prometheus recorder on port {port}"))?;

    tracing::info!(port, "prometheus metrics endpoint listening");
    Ok(())
}
