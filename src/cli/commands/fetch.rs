//! Fetch command implementation.

use anyhow::{bail, Context, Result};
use chrono::{Days, NaiveDate, Utc};
use quantlab_config::AppConfig;
use quantlab_core::traits::ArchiveFetcher;
use quantlab_core::types::{DataRequest, KlinesRequest, TradesRequest};
use quantlab_data::{BinanceVisionFetcher, HistoricalDataProcessor};
use std::path::PathBuf;
use tracing::info;

use super::api_client;
use super::ingest::print_summary;
use crate::cli::{FetchArgs, OutputFormat};

pub async fn run(args: FetchArgs, config: &AppConfig) -> Result<()> {
    let request = build_request(&args, Utc::now().date_naive())?;

    if let Some(path) = &args.save_template {
        let json = serde_json::to_string_pretty(&request.to_value())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write template {}", path.display()))?;
        info!("Template saved to {:?}", path);
    }

    let fetcher = BinanceVisionFetcher::new(api_client(&config.data)?, &config.data.download_dir)
        .with_max_concurrent_downloads(config.data.max_concurrent_downloads);

    info!(
        request = request.name(),
        symbol = request.symbol(),
        kind = request.kind().as_str(),
        start = %request.start_date(),
        end = %request.end_date(),
        "Fetching archives"
    );

    let paths = fetcher.ensure_downloaded(&request).await?;
    let present: Vec<PathBuf> = paths.iter().filter(|p| p.exists()).cloned().collect();

    println!(
        "{} of {} daily archives available under {}",
        present.len(),
        paths.len(),
        fetcher.download_dir().display()
    );

    if args.ingest {
        let processor = HistoricalDataProcessor::new(&config.data.db_path);
        let summary = tokio::task::spawn_blocking(move || processor.process_and_store(&present))
            .await?
            .context("Failed to store archives")?;
        print_summary(&summary, OutputFormat::Text)?;
    }

    Ok(())
}

/// Request from a saved template or from the command-line range.
fn build_request(args: &FetchArgs, today: NaiveDate) -> Result<DataRequest> {
    if let Some(path) = &args.template {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        return DataRequest::from_json(&json)
            .with_context(|| format!("Invalid template {}", path.display()));
    }

    let Some(symbol) = args.symbol.as_deref() else {
        bail!("--symbol is required unless --template is given");
    };
    let (start, end) = date_range(args, today)?;

    let request = if args.trades {
        TradesRequest::new(args.name.clone(), symbol, start, end)?.into()
    } else {
        KlinesRequest::new(args.name.clone(), symbol, args.interval, start, end)?.into()
    };
    Ok(request)
}

fn date_range(args: &FetchArgs, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    match (args.start, args.end, args.days_ago_start) {
        (Some(start), Some(end), None) => Ok((start, end)),
        (None, None, Some(ago_start)) => {
            let ago_end = args.days_ago_end.unwrap_or(0);
            let start = today
                .checked_sub_days(Days::new(ago_start.into()))
                .context("--days-ago-start is out of range")?;
            let end = today
                .checked_sub_days(Days::new(ago_end.into()))
                .context("--days-ago-end is out of range")?;
            Ok((start, end))
        }
        _ => bail!("Provide --start and --end, or --days-ago-start"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use quantlab_core::types::{DataKind, Interval};

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: FetchArgs,
    }

    fn parse(argv: &[&str]) -> FetchArgs {
        let mut full = vec!["fetch"];
        full.extend_from_slice(argv);
        Wrapper::try_parse_from(full).unwrap().args
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_explicit_range() {
        let args = parse(&[
            "--symbol", "btcusdt", "--interval", "1h", "--start", "2024-01-01", "--end",
            "2024-01-03",
        ]);
        let request = build_request(&args, day(2024, 6, 1)).unwrap();

        assert_eq!(request.symbol(), "BTCUSDT");
        assert_eq!(request.kind(), DataKind::Klines);
        assert_eq!(request.days().count(), 3);
        match request {
            DataRequest::Klines(r) => assert_eq!(r.interval, Interval::Hour1),
            DataRequest::Trades(_) => panic!("expected klines"),
        }
    }

    #[test]
    fn test_days_ago_range() {
        let args = parse(&["--symbol", "ETHUSDT", "--trades", "--days-ago-start", "3"]);
        let request = build_request(&args, day(2024, 3, 2)).unwrap();

        assert_eq!(request.kind(), DataKind::Trades);
        assert_eq!(request.start_date(), day(2024, 2, 28));
        assert_eq!(request.end_date(), day(2024, 3, 2));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let args = parse(&[
            "--symbol", "BTCUSDT", "--start", "2024-01-05", "--end", "2024-01-01",
        ]);
        assert!(build_request(&args, day(2024, 6, 1)).is_err());
    }

    #[test]
    fn test_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        let saved: DataRequest =
            KlinesRequest::new("saved", "solusdt", Interval::Daily, day(2024, 1, 1), day(2024, 1, 2))
                .unwrap()
                .into();
        std::fs::write(&path, saved.to_value().to_string()).unwrap();

        let args = parse(&["--template", path.to_str().unwrap()]);
        let request = build_request(&args, day(2024, 6, 1)).unwrap();
        assert_eq!(request, saved);
    }

    #[test]
    fn test_missing_range() {
        assert!(Wrapper::try_parse_from(["fetch", "--symbol", "BTCUSDT", "--start", "2024-01-01"]).is_err());

        let args = parse(&["--symbol", "BTCUSDT"]);
        assert!(build_request(&args, day(2024, 6, 1)).is_err());
    }
}
