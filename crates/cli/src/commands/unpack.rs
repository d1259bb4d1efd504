//! `unpack` command implementation.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use contracts::CaptureConfig;
use decoder::Calibration;
use tracing::{info, warn};
use unpacker::{UnpackOptions, Unpacker};

use crate::cli::UnpackArgs;
use crate::error::{CliError, Result};
use crate::pipeline::print_unpack_summary;

/// Execute the `unpack` command
pub async fn run_unpack(args: &UnpackArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    apply_overrides(&mut config, args);
    config_loader::validate(&config)?;

    let calibration = match config.calibration.elevation_deg.as_deref() {
        Some(angles) => {
            info!("Using elevation override from configuration");
            Calibration::with_elevation(angles)?
        }
        None => Calibration::xt32(),
    };

    let options = UnpackOptions {
        input_dir: args.directory.clone(),
        output_dir: config.unpack.output_dir.clone(),
        format: config.unpack.format,
        jobs: config.unpack.jobs,
    };
    let unpacker = Unpacker::new(calibration, options);

    let started = Instant::now();
    let report = tokio::task::spawn_blocking(move || unpacker.run())
        .await
        .context("Unpack worker panicked")??;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{json}");
    } else {
        print_unpack_summary(&report, started.elapsed());
    }

    if !report.is_clean() {
        warn!(
            skipped = report.skipped_count(),
            records = report.records,
            "Some records were skipped"
        );
        if args.fail_on_skip {
            return Err(CliError::skipped_records(report.skipped_count(), report.records));
        }
    }
    Ok(())
}

fn apply_overrides(config: &mut CaptureConfig, args: &UnpackArgs) {
    if let Some(ref output) = args.output {
        config.unpack.output_dir = Some(output.clone());
    }
    if let Some(format) = args.format {
        config.unpack.format = format.into();
    }
    if let Some(jobs) = args.jobs {
        config.unpack.jobs = jobs;
    }
}
