//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `cert_harvest` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Wiring stdin or the input file to stdout
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use cert_harvest::initialization::{init_crypto_provider, init_logger_with};
use cert_harvest::{open_input, run_harvest, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    if let Err(e) = harvest(config).await {
        eprintln!("cert_harvest error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn harvest(config: Config) -> Result<()> {
    let input = open_input(&config.file).await?;
    // Names go to stdout; the summary is logged to stderr
    run_harvest(config, input, tokio::io::stdout()).await?;
    Ok(())
}
