//! # Application Entry Point
//!
//! Parses the CLI configuration, initializes logging on standard error,
//! and hands off to the pipeline driver. Exits 0 on success, 1 on any
//! propagated error.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pbwt::config::Config;
use pbwt::pipelines;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::parse();
    pipelines::run(&config)?;
    Ok(())
}
