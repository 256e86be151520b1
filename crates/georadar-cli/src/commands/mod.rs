//! Command implementations

mod check;
mod config;
mod distance;
mod watch;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::errors;
use crate::output::OutputWriter;
use anyhow::Result;
use georadar_core::config::{CliConfigOverrides, EngineConfig, LayeredConfig};
use georadar_core::models::Coordinate;
use georadar_geo::validate_coordinate;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    let mut overrides = CliConfigOverrides {
        range_threshold_km: cli.range_km,
        polling_interval_ms: cli.poll_interval_ms,
        ..Default::default()
    };
    match &cli.command {
        Commands::Check(args) => overrides.catalog_url = args.catalog.catalog_url.clone(),
        Commands::Watch(args) => {
            overrides.catalog_url = args.catalog.catalog_url.clone();
            overrides.cooldown_interval_ms = args.cooldown_ms;
        }
        Commands::Distance(_) | Commands::Config => {}
    }
    let config = load_config(cli.config.as_deref(), overrides)?;

    match cli.command {
        Commands::Distance(args) => distance::execute(args, &config, &output),
        Commands::Check(args) => check::execute(args, &config, &output).await,
        Commands::Watch(args) => watch::execute(args, &config, &output).await,
        Commands::Config => config::execute(&config, &output),
    }
}

/// Build a coordinate from command-line values, rejecting out-of-range input
fn parse_coordinate(label: &str, lat: f64, long: f64) -> Result<Coordinate> {
    let coordinate = Coordinate::new(lat, long);
    let validation = validate_coordinate(&coordinate);
    if !validation.is_valid {
        return Err(errors::invalid_coordinate(label, &validation.summary()).into());
    }
    Ok(coordinate)
}

fn engine_config(config: &LayeredConfig) -> Result<EngineConfig> {
    config.engine_config().map_err(|e| errors::invalid_config(&e).into())
}
