//! Triple coincidence combiner.

use quantlab_core::{error::DetectorError, traits::Detector, types::SignalFrame};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the signal combiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinerConfig {
    /// Bars before a key candle searched for an accumulation zone
    pub tolerance: usize,
    /// Minimum trend R² at the key candle
    pub min_r_squared: f64,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            tolerance: 8,
            min_r_squared: 0.45,
        }
    }
}

impl CombinerConfig {
    pub fn validate(&self) -> Result<(), DetectorError> {
        if !(0.0..=1.0).contains(&self.min_r_squared) {
            return Err(DetectorError::InvalidConfig(
                "min_r_squared must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }
}

/// Marks key candles that coincide with a nearby zone and a clean trend.
///
/// Reads the key candle, zone and trend annotations, so it runs after those
/// detectors.
pub struct SignalCombiner {
    config: CombinerConfig,
}

impl SignalCombiner {
    pub fn new(config: CombinerConfig) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CombinerConfig {
        &self.config
    }

    fn is_coincidence(&self, frame: &SignalFrame, index: usize) -> bool {
        let start = index.saturating_sub(self.config.tolerance);
        let zone_nearby = frame.rows[start..=index]
            .iter()
            .any(|r| r.in_accumulation_zone);
        let trend_ok = frame.rows[index]
            .trend_r_squared
            .is_some_and(|r2| r2 >= self.config.min_r_squared);
        zone_nearby && trend_ok
    }
}

impl Detector for SignalCombiner {
    fn name(&self) -> &str {
        "signal_combiner"
    }

    fn description(&self) -> &str {
        "Key candles near an accumulation zone inside a well-fitted trend"
    }

    fn detect(&self, frame: &mut SignalFrame) -> Result<(), DetectorError> {
        let hits: Vec<usize> = frame
            .key_candle_indices()
            .into_iter()
            .filter(|&i| self.is_coincidence(frame, i))
            .collect();

        for row in &mut frame.rows {
            row.is_triple_coincidence = false;
        }
        for &i in &hits {
            frame.rows[i].is_triple_coincidence = true;
        }

        debug!(symbol = %frame.symbol, coincidences = hits.len(), "Signal combination");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantlab_core::types::{Bar, BarSeries, Interval};

    fn frame(n: usize) -> SignalFrame {
        let bars = (0..n)
            .map(|i| Bar::new(i as i64, 1.0, 1.0, 1.0, 1.0, 1.0))
            .collect();
        SignalFrame::from_series(&BarSeries::from_bars("TEST", Interval::Daily, bars))
    }

    #[test]
    fn test_zone_within_tolerance() {
        let mut frame = frame(30);
        frame.rows[12].in_accumulation_zone = true;
        frame.rows[20].is_key_candle = true;
        frame.rows[20].trend_r_squared = Some(0.6);

        SignalCombiner::new(CombinerConfig::default())
            .unwrap()
            .detect(&mut frame)
            .unwrap();

        assert_eq!(frame.triple_coincidence_indices(), vec![20]);
    }

    #[test]
    fn test_no_zone_nearby() {
        let mut frame = frame(30);
        frame.rows[11].in_accumulation_zone = true;
        frame.rows[20].is_key_candle = true;
        frame.rows[20].trend_r_squared = Some(0.9);

        SignalCombiner::new(CombinerConfig::default())
            .unwrap()
            .detect(&mut frame)
            .unwrap();

        assert!(frame.triple_coincidence_indices().is_empty());
    }

    #[test]
    fn test_weak_or_missing_trend() {
        let mut frame = frame(30);
        frame.rows[3].in_accumulation_zone = true;
        frame.rows[4].is_key_candle = true;
        frame.rows[4].trend_r_squared = Some(0.44);
        frame.rows[5].in_accumulation_zone = true;
        frame.rows[5].is_key_candle = true;

        SignalCombiner::new(CombinerConfig::default())
            .unwrap()
            .detect(&mut frame)
            .unwrap();

        assert!(frame.triple_coincidence_indices().is_empty());
    }

    #[test]
    fn test_window_clamped_at_start() {
        let mut frame = frame(10);
        frame.rows[0].in_accumulation_zone = true;
        frame.rows[2].is_key_candle = true;
        frame.rows[2].trend_r_squared = Some(0.45);

        SignalCombiner::new(CombinerConfig::default())
            .unwrap()
            .detect(&mut frame)
            .unwrap();

        assert_eq!(frame.triple_coincidence_indices(), vec![2]);
    }
}
