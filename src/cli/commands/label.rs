//! Label command implementation.

use anyhow::{Context, Result};
use quantlab_config::AppConfig;
use quantlab_core::types::BarSeries;
use quantlab_labeling::{LabelReport, PotentialCaptureEngine};
use quantlab_signals::SignalOrchestrator;
use tracing::info;

use crate::cli::{LabelArgs, OutputFormat};

pub async fn run(args: LabelArgs, config: &AppConfig) -> Result<()> {
    let engine = PotentialCaptureEngine::new(config.labeling.clone())
        .context("Invalid labeling configuration")?;
    let mut orchestrator = SignalOrchestrator::new(&config.data.db_path, config.signals.clone())
        .context("Failed to open signal pipeline")?;

    let frame = orchestrator.generate_signals(&args.symbol, args.interval)?;
    let events = SignalOrchestrator::signal_events(&frame, args.events);
    info!(events = events.len(), kind = %args.events, "Labeling events");

    let series = BarSeries::from_bars(
        frame.symbol.clone(),
        frame.interval,
        frame.bars().copied().collect(),
    );
    let labels = engine.label_events(&series, &events);
    let report = LabelReport::new(
        frame.symbol.clone(),
        frame.interval,
        engine.config().clone(),
        labels,
    );

    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    if let Some(path) = &args.save {
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let contents = if is_csv {
            report.labels_to_csv()
        } else {
            report.to_json()?
        };
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Labels saved to {:?}", path);
    }

    Ok(())
}
