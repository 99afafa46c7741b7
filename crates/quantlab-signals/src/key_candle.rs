//! Key candle detection.
//!
//! A key candle is an absorption bar: volume far above its recent
//! distribution while the body stays small relative to the range. Only the
//! first bar of a run of such bars is flagged.

use quantlab_core::{
    error::DetectorError,
    traits::{Detector, Indicator},
    types::SignalFrame,
};
use quantlab_indicators::RollingQuantile;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the key candle detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyCandleConfig {
    /// Bars of volume history behind each threshold
    pub volume_lookback: usize,
    /// Quantile of the lookback volumes a bar must exceed
    pub volume_percentile_threshold: f64,
    /// Maximum body/range ratio
    pub body_percentile_threshold: f64,
}

impl Default for KeyCandleConfig {
    fn default() -> Self {
        Self {
            volume_lookback: 20,
            volume_percentile_threshold: 0.90,
            body_percentile_threshold: 0.30,
        }
    }
}

impl KeyCandleConfig {
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.volume_lookback == 0 {
            return Err(DetectorError::InvalidConfig(
                "volume_lookback must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.volume_percentile_threshold) {
            return Err(DetectorError::InvalidConfig(
                "volume_percentile_threshold must be between 0 and 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.body_percentile_threshold) {
            return Err(DetectorError::InvalidConfig(
                "body_percentile_threshold must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }
}

/// Flags high-volume, small-body bars.
pub struct KeyCandleDetector {
    config: KeyCandleConfig,
}

impl KeyCandleDetector {
    pub fn new(config: KeyCandleConfig) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &KeyCandleConfig {
        &self.config
    }

    /// Threshold for each bar from the `lookback` volumes strictly before it.
    fn volume_thresholds(&self, volumes: &[f64]) -> Vec<Option<f64>> {
        let lookback = self.config.volume_lookback;
        let quantiles =
            RollingQuantile::new(lookback, self.config.volume_percentile_threshold).calculate(volumes);

        (0..volumes.len())
            .map(|i| {
                if i < lookback {
                    None
                } else {
                    quantiles.get(i - lookback).copied()
                }
            })
            .collect()
    }
}

impl Detector for KeyCandleDetector {
    fn name(&self) -> &str {
        "key_candle"
    }

    fn description(&self) -> &str {
        "High-volume bars with a small body relative to their range"
    }

    fn warmup_period(&self) -> usize {
        self.config.volume_lookback
    }

    fn detect(&self, frame: &mut SignalFrame) -> Result<(), DetectorError> {
        let thresholds = self.volume_thresholds(&frame.volumes());
        let mut prev_candidate = false;
        let mut flagged = 0;

        for (row, threshold) in frame.rows.iter_mut().zip(thresholds) {
            row.volume_threshold = threshold;
            row.body_size = row.bar.body();
            row.body_percentage = row.bar.body_ratio();

            let candidate = threshold.is_some_and(|t| row.bar.volume > t)
                && row.body_percentage < self.config.body_percentile_threshold;

            row.is_key_candle = candidate && !prev_candidate;
            if row.is_key_candle {
                flagged += 1;
            }
            prev_candidate = candidate;
        }

        debug!(symbol = %frame.symbol, key_candles = flagged, "Key candle detection");
        Ok(())
    }
}
