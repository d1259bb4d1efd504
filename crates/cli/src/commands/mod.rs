//! Command implementations.

mod read;
mod unpack;

pub use read::run_read;
pub use unpack::run_unpack;

use std::path::Path;

use anyhow::Context;
use contracts::CaptureConfig;
use tracing::info;

/// Load the configuration file if one was given, else the built-in defaults
///
/// The result is validated again by callers after CLI overrides are applied.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<CaptureConfig> {
    match path {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => Ok(CaptureConfig::default()),
    }
}
