//! Binary crate for the `weather-time` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting
//! - Serving the tools to an agent host over stdio

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod serve;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}

/// Logs go to stderr; stdout carries tool output.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "weather_time=debug,weather_time_core=debug"
    } else {
        "weather_time=info,weather_time_core=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
