//! Proxim CLI - Command-line interface
//!
//! The host shell around the enrichment core: GeoJSON loading, geocoding,
//! and output formatting live here, outside the computational crates.

mod cli;
mod commands;
mod geocode;
mod loader;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Create async runtime (geocoding is the only suspension point)
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { commands::execute(cli).await })?;

    Ok(())
}
