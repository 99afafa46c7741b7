//! Validate configuration command.

use anyhow::Result;
use quantlab_config::load_config;
use std::path::Path;

use crate::cli::ValidateArgs;

pub async fn run(args: ValidateArgs, config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Database: {}", config.data.db_path);
    println!("Download dir: {}", config.data.download_dir);
    println!("Archive source: {}", config.data.base_url);
    println!(
        "Key candle: lookback {}, volume q{:.2}, body q{:.2}",
        config.signals.key_candle.volume_lookback,
        config.signals.key_candle.volume_percentile_threshold,
        config.signals.key_candle.body_percentile_threshold
    );
    println!(
        "Labeling: profit factors {:?}, stop {:.2} ATR, {} bars",
        config.labeling.profit_factors,
        config.labeling.stop_loss_factor,
        config.labeling.time_limit
    );

    if args.show {
        println!();
        println!("{}", config.to_toml()?);
    }

    Ok(())
}
