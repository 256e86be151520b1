//! GeoRadar CLI - Command-line interface
//!
//! Composition root wiring the polling engine to catalog, location and
//! notification adapters.

mod cli;
mod commands;
mod config_loader;
mod errors;
mod output;
mod output_types;
mod sources;
mod terminal;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use errors::CliError;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Create async runtime
    let runtime = tokio::runtime::Runtime::new()?;

    // Execute the command
    match runtime.block_on(commands::execute(cli)) {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<CliError>() {
            Some(cli_error) => {
                cli_error.display();
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}
