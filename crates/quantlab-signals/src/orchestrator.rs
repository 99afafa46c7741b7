//! Signal pipeline orchestration.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use quantlab_core::{
    error::{DetectorError, LabError},
    traits::Detector,
    types::{AccumulationZone, Interval, SignalFrame},
};
use quantlab_data::{BarCache, CacheStats, KlineStore};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    AccumulationZoneDetector, KeyCandleDetector, SignalCombiner, SignalScorer, SignalsConfig,
    TrendDetector,
};

/// Which flagged rows become labeling events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    KeyCandles,
    #[default]
    Triple,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::KeyCandles => f.write_str("key-candles"),
            EventKind::Triple => f.write_str("triple"),
        }
    }
}

impl FromStr for EventKind {
    type Err = DetectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "key-candles" | "key_candles" | "key" => Ok(EventKind::KeyCandles),
            "triple" | "triple-coincidence" => Ok(EventKind::Triple),
            _ => Err(DetectorError::InvalidConfig(format!("unknown event kind: {}", s))),
        }
    }
}

/// Loads stored klines and runs the detector pipeline over them.
pub struct SignalOrchestrator {
    store: KlineStore,
    cache: BarCache,
    zones: AccumulationZoneDetector,
    pipeline: Vec<Box<dyn Detector>>,
}

impl SignalOrchestrator {
    /// Open the pipeline over an existing database.
    pub fn new(db_path: impl AsRef<Path>, config: SignalsConfig) -> Result<Self, LabError> {
        let store = KlineStore::open_existing(db_path)?;
        config.validate()?;

        let pipeline: Vec<Box<dyn Detector>> = vec![
            Box::new(AccumulationZoneDetector::new(config.accumulation_zone.clone())?),
            Box::new(KeyCandleDetector::new(config.key_candle.clone())?),
            Box::new(TrendDetector::new(config.trend.clone())?),
            Box::new(SignalCombiner::new(config.combiner.clone())?),
            Box::new(SignalScorer::new(config.scorer.clone())?),
        ];

        Ok(Self {
            store,
            cache: BarCache::new(config.cache_entries),
            zones: AccumulationZoneDetector::new(config.accumulation_zone)?,
            pipeline,
        })
    }

    /// Stage names in execution order.
    pub fn stages(&self) -> Vec<&str> {
        self.pipeline.iter().map(|d| d.name()).collect()
    }

    /// Run every stage over the stored klines for a symbol and interval.
    ///
    /// No stored data yields an empty frame.
    #[instrument(skip(self))]
    pub fn generate_signals(
        &mut self,
        symbol: &str,
        interval: Interval,
    ) -> Result<SignalFrame, LabError> {
        let symbol = symbol.trim().to_uppercase();
        let store = &self.store;
        let series = self
            .cache
            .get_or_try_load(&symbol, interval, || store.load_series(&symbol, interval))?;

        if series.is_empty() {
            info!("No stored klines");
            return Ok(SignalFrame::empty(symbol, interval));
        }

        let mut frame = SignalFrame::from_series(&series);
        for stage in &self.pipeline {
            stage.detect(&mut frame)?;
        }

        info!(
            bars = frame.len(),
            key_candles = frame.key_candle_indices().len(),
            triple = frame.triple_coincidence_indices().len(),
            "Signals generated"
        );
        Ok(frame)
    }

    /// Feature summaries of the zones marked on `frame`.
    pub fn zones(&self, frame: &SignalFrame) -> Vec<AccumulationZone> {
        self.zones.zones(frame)
    }

    /// Drop cached bars for a symbol, e.g. after new data was ingested.
    pub fn invalidate(&mut self, symbol: &str) {
        self.cache.invalidate(symbol);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Bar timestamps of the flagged rows.
    pub fn signal_events(frame: &SignalFrame, kind: EventKind) -> Vec<i64> {
        let indices = match kind {
            EventKind::KeyCandles => frame.key_candle_indices(),
            EventKind::Triple => frame.triple_coincidence_indices(),
        };
        indices
            .into_iter()
            .map(|i| frame.rows[i].bar.timestamp)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantlab_core::error::StorageError;
    use quantlab_core::types::Kline;

    const DAY_MS: i64 = 86_400_000;
    const START_MS: i64 = 1_672_531_200_000;

    /// Deterministic values in [0, 1).
    fn lcg(seed: &mut u64) -> f64 {
        *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (*seed >> 11) as f64 / (1u64 << 53) as f64
    }

    fn fixture_klines() -> Vec<Kline> {
        let mut seed = 42;
        (0..30)
            .map(|i| {
                let open = 100.0 + lcg(&mut seed) * 10.0;
                let (open, high, low, close, volume) = if i == 25 {
                    (150.0, 180.0, 120.0, 150.0, 500_000.0)
                } else {
                    (open, open + 10.0, open - 10.0, open + 8.0, 1000.0 + lcg(&mut seed) * 1000.0)
                };
                let open_time = START_MS + i as i64 * DAY_MS;
                Kline {
                    symbol: "BTCUSDT".to_string(),
                    interval: Interval::Daily,
                    open_time,
                    open,
                    high,
                    low,
                    close,
                    volume,
                    close_time: open_time + DAY_MS - 1,
                    quote_asset_volume: volume * close,
                    number_of_trades: 100,
                    taker_buy_base_asset_volume: volume / 2.0,
                    taker_buy_quote_asset_volume: volume * close / 2.0,
                }
            })
            .collect()
    }

    fn fixture_db(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("lab.db");
        let mut store = KlineStore::open(&path).unwrap();
        store.insert_klines(&fixture_klines()).unwrap();
        path
    }

    #[test]
    fn test_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let result = SignalOrchestrator::new(dir.path().join("none.db"), SignalsConfig::default());
        assert!(matches!(
            result,
            Err(LabError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[test]
    fn test_pipeline_finds_key_candle() {
        let dir = tempfile::tempdir().unwrap();
        let db = fixture_db(dir.path());
        let mut orchestrator = SignalOrchestrator::new(&db, SignalsConfig::default()).unwrap();

        assert_eq!(
            orchestrator.stages(),
            vec![
                "accumulation_zone",
                "key_candle",
                "trend",
                "signal_combiner",
                "signal_scorer"
            ]
        );

        let frame = orchestrator
            .generate_signals("btcusdt", Interval::Daily)
            .unwrap();
        assert_eq!(frame.len(), 30);
        assert_eq!(frame.symbol, "BTCUSDT");
        assert_eq!(frame.key_candle_indices(), vec![25]);
        assert!(frame.rows.iter().all(|r| r.trend_id.is_some()));

        let events = SignalOrchestrator::signal_events(&frame, EventKind::KeyCandles);
        assert_eq!(events, vec![START_MS + 25 * DAY_MS]);
    }

    #[test]
    fn test_empty_result_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let db = fixture_db(dir.path());
        let mut orchestrator = SignalOrchestrator::new(&db, SignalsConfig::default()).unwrap();

        let empty = orchestrator
            .generate_signals("ETHUSDT", Interval::Daily)
            .unwrap();
        assert!(empty.is_empty());

        orchestrator.generate_signals("BTCUSDT", Interval::Daily).unwrap();
        orchestrator.generate_signals("BTCUSDT", Interval::Daily).unwrap();
        let stats = orchestrator.cache_stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 1);

        orchestrator.invalidate("BTCUSDT");
        assert_eq!(orchestrator.cache_stats().entries, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = fixture_db(dir.path());
        let mut config = SignalsConfig::default();
        config.combiner.min_r_squared = 2.0;

        assert!(matches!(
            SignalOrchestrator::new(&db, config),
            Err(LabError::Detector(DetectorError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_event_kind_parse() {
        assert_eq!("key-candles".parse::<EventKind>().unwrap(), EventKind::KeyCandles);
        assert_eq!("triple".parse::<EventKind>().unwrap(), EventKind::Triple);
        assert!("zones".parse::<EventKind>().is_err());
    }
}
