//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use georadar_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "georadar.toml";

/// Resolve the config file to read, if any
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            fallback.is_file().then_some(fallback)
        }
    }
}

/// Load layered configuration: defaults, file, environment, then CLI overrides
pub fn load_config(explicit: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_path(explicit) {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}
