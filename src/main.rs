//! Research laboratory CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use quantlab_config::load_config_or_default;
use quantlab_monitor::setup_logging;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json = cli.json_logs || config.logging.is_json();
    let _guard = setup_logging(&level, json, config.logging.file.as_deref().map(Path::new));

    if !matches!(cli.command, Commands::ValidateConfig(_)) {
        config.validate().context("Invalid configuration")?;
    }

    match cli.command {
        Commands::Fetch(args) => cli::commands::fetch::run(args, &config).await,
        Commands::Ingest(args) => cli::commands::ingest::run(args, &config).await,
        Commands::QueryOpen(args) => cli::commands::query_open::run(args, &config).await,
        Commands::Signals(args) => cli::commands::signals::run(args, &config).await,
        Commands::Label(args) => cli::commands::label::run(args, &config).await,
        Commands::Detectors => cli::commands::detectors::run().await,
        Commands::ValidateConfig(args) => cli::commands::validate::run(args, &cli.config).await,
    }
}
