use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// GeoRadar - Proximity alerts for nearby events and station closures
#[derive(Parser, Debug)]
#[command(name = "georadar")]
#[command(about = "Proximity alerts for nearby events and station closures", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML configuration file (defaults to ./georadar.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the proximity radius in kilometers
    #[arg(long, global = true, value_name = "KM")]
    pub range_km: Option<f64>,

    /// Override the polling interval in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Great-circle distance between two coordinates
    Distance(DistanceArgs),

    /// Evaluate every signal once at a fixed location without notifying
    Check(CheckArgs),

    /// Poll signals around a fixed location and print notifications
    Watch(WatchArgs),

    /// Show the resolved configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct DistanceArgs {
    /// Latitude of the first point
    #[arg(allow_negative_numbers = true)]
    pub lat1: f64,

    /// Longitude of the first point
    #[arg(allow_negative_numbers = true)]
    pub lon1: f64,

    /// Latitude of the second point
    #[arg(allow_negative_numbers = true)]
    pub lat2: f64,

    /// Longitude of the second point
    #[arg(allow_negative_numbers = true)]
    pub lon2: f64,
}

/// Where signals are read from
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Read signals from a JSON file
    #[arg(long, value_name = "FILE", conflicts_with = "catalog_url")]
    pub catalog: Option<PathBuf>,

    /// Fetch signals from `<URL>/events`
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Latitude of the observer
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the observer
    #[arg(long, allow_negative_numbers = true)]
    pub long: f64,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Latitude of the observer
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the observer
    #[arg(long, allow_negative_numbers = true)]
    pub long: f64,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Stop after this many seconds (runs until Ctrl-C otherwise)
    #[arg(long, value_name = "SECS")]
    pub duration_secs: Option<u64>,

    /// Override the cooldown between routine repeats in milliseconds
    #[arg(long, value_name = "MS")]
    pub cooldown_ms: Option<u64>,
}
