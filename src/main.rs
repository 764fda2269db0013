mod commands;
mod fetch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use macrocal_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "macrocal")]
#[command(about = "Generate an ICS calendar of US macro data releases (CPI, NFP, FOMC, GDP, PCE)")]
struct Cli {
    /// Config file (default: ~/.config/macrocal/config.toml, if it exists)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the calendar (default: us-macro-<year>-taipei.ics)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(output) = cli.output {
        config.output = Some(output);
    }

    commands::generate::run(config).await
}

/// Log to stderr so stdout only carries the result line.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
