//! Signals command implementation.

use anyhow::{Context, Result};
use quantlab_config::AppConfig;
use quantlab_core::types::{AccumulationZone, SignalFrame, SignalRow, TrendDirection};
use quantlab_signals::SignalOrchestrator;
use serde_json::json;

use crate::cli::{OutputFormat, SignalsArgs};

pub async fn run(args: SignalsArgs, config: &AppConfig) -> Result<()> {
    let mut orchestrator = SignalOrchestrator::new(&config.data.db_path, config.signals.clone())
        .context("Failed to open signal pipeline")?;
    let frame = orchestrator.generate_signals(&args.symbol, args.interval)?;
    let zones = if args.zones {
        orchestrator.zones(&frame)
    } else {
        Vec::new()
    };

    let rows: Vec<&SignalRow> = frame
        .rows
        .iter()
        .filter(|r| args.all_rows || r.is_key_candle || r.is_triple_coincidence)
        .collect();

    match args.output {
        OutputFormat::Json => {
            let value = json!({
                "symbol": frame.symbol,
                "interval": frame.interval,
                "bars": frame.len(),
                "key_candles": frame.key_candle_indices().len(),
                "triple_coincidences": frame.triple_coincidence_indices().len(),
                "rows": rows,
                "zones": zones,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => print_text(&frame, &rows, &zones, args.zones),
    }

    Ok(())
}

fn print_text(frame: &SignalFrame, rows: &[&SignalRow], zones: &[AccumulationZone], show_zones: bool) {
    println!("Signals {} {}", frame.symbol, frame.interval);
    println!("═══════════════════════════════════════════════════════════");

    if frame.is_empty() {
        println!("  No stored klines. Fetch and ingest data first.");
        return;
    }

    println!("  Bars:                {}", frame.len());
    println!("  Key candles:         {}", frame.key_candle_indices().len());
    println!(
        "  Triple coincidences: {}",
        frame.triple_coincidence_indices().len()
    );
    println!();

    println!(
        "  {:<20} {:>12} {:>14} {:>4} {:>5} {:>8} {:>6} {:>6} {:>6}",
        "time", "close", "volume", "key", "zone", "trend", "r2", "triple", "score"
    );
    println!("  ───────────────────────────────────────────────────────────────────────────────────────");
    for row in rows {
        println!(
            "  {:<20} {:>12.4} {:>14.2} {:>4} {:>5} {:>8} {:>6} {:>6} {:>6}",
            row.bar.datetime().format("%Y-%m-%d %H:%M:%S"),
            row.bar.close,
            row.bar.volume,
            if row.is_key_candle { "*" } else { "" },
            row.zone_id.map(|z| z.to_string()).unwrap_or_default(),
            match row.trend_direction {
                Some(TrendDirection::Bullish) => "bullish",
                Some(TrendDirection::Bearish) => "bearish",
                None => "",
            },
            row.trend_r_squared.map(|r| format!("{:.3}", r)).unwrap_or_default(),
            if row.is_triple_coincidence { "*" } else { "" },
            row.final_score.map(|s| format!("{:.3}", s)).unwrap_or_default(),
        );
    }

    if show_zones {
        println!();
        println!("ACCUMULATION ZONES");
        println!("───────────────────────────────────────────────────────────");
        if zones.is_empty() {
            println!("  none");
        }
        for zone in zones {
            println!(
                "  #{:<3} {} → {} ({} bars) low {:.4} high {:.4} vwap {:.4} poc {:.4} mfi {:.1} quality {:.2}",
                zone.zone_id,
                zone.datetime_start.format("%Y-%m-%d %H:%M"),
                zone.datetime_end.format("%Y-%m-%d %H:%M"),
                zone.bars(),
                zone.low,
                zone.high,
                zone.vwap,
                zone.poc,
                zone.mfi,
                zone.quality_score
            );
        }
    }
}
