//! Open price lookup.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use quantlab_config::AppConfig;
use quantlab_data::KlineStore;

use crate::cli::QueryOpenArgs;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub async fn run(args: QueryOpenArgs, config: &AppConfig) -> Result<()> {
    let open_time = parse_open_time(&args.time)?;
    let symbol = args.symbol.trim().to_uppercase();

    let store = KlineStore::open_existing(&config.data.db_path)?;
    match store.open_price_at(&symbol, args.interval, open_time)? {
        Some(price) => println!("{} {} {} open: {}", symbol, args.interval, args.time, price),
        None => println!("No {} {} kline opens at {}", symbol, args.interval, args.time),
    }

    Ok(())
}

/// UTC timestamp in milliseconds.
fn parse_open_time(time: &str) -> Result<i64> {
    let parsed = NaiveDateTime::parse_from_str(time.trim(), TIME_FORMAT)
        .with_context(|| format!("Expected \"YYYY-MM-DD HH:MM:SS\", got \"{}\"", time))?;
    Ok(parsed.and_utc().timestamp_millis())
}
