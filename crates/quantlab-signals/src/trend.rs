//! Trend segmentation.
//!
//! ZigZag pivots split the series into segments; each segment is described
//! by a least-squares fit of its closes.

use quantlab_core::{
    error::DetectorError,
    traits::Detector,
    types::{SignalFrame, TrendDirection},
};
use quantlab_indicators::{linear_regression, ZigZag};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the trend detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Minimum swing between pivots, in percent
    pub deviation: f64,
    /// Bars on each side of a pivot
    pub pivot_legs: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            deviation: 5.0,
            pivot_legs: 3,
        }
    }
}

impl TrendConfig {
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.deviation < 0.0 {
            return Err(DetectorError::InvalidConfig(
                "deviation must not be negative".into(),
            ));
        }
        if self.pivot_legs == 0 {
            return Err(DetectorError::InvalidConfig(
                "pivot_legs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Labels every bar with the trend segment it belongs to.
pub struct TrendDetector {
    config: TrendConfig,
}

impl TrendDetector {
    pub fn new(config: TrendConfig) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Pivot indices plus the first and last bar, sorted and unique.
    fn segment_bounds(&self, frame: &SignalFrame) -> Vec<usize> {
        let zigzag = ZigZag::new(self.config.deviation, self.config.pivot_legs);
        let mut bounds: Vec<usize> = zigzag
            .pivots(&frame.highs(), &frame.lows())
            .into_iter()
            .map(|p| p.index)
            .collect();
        bounds.push(0);
        bounds.push(frame.len() - 1);
        bounds.sort_unstable();
        bounds.dedup();
        bounds
    }
}

impl Detector for TrendDetector {
    fn name(&self) -> &str {
        "trend"
    }

    fn description(&self) -> &str {
        "ZigZag segments scored by linear regression slope and R²"
    }

    fn warmup_period(&self) -> usize {
        2 * self.config.pivot_legs + 1
    }

    fn detect(&self, frame: &mut SignalFrame) -> Result<(), DetectorError> {
        if frame.is_empty() {
            return Ok(());
        }

        let bounds = self.segment_bounds(frame);
        let closes = frame.closes();
        let mut segments = 0;

        for (trend_id, pair) in bounds.windows(2).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            let Some(fit) = linear_regression(&closes[start..=end]) else {
                continue;
            };

            let direction = TrendDirection::from_slope(fit.slope);
            for row in &mut frame.rows[start..=end] {
                row.trend_id = Some(trend_id);
                row.trend_direction = Some(direction);
                row.trend_slope = Some(fit.slope);
                row.trend_r_squared = Some(fit.r_squared);
            }
            segments += 1;
        }

        debug!(symbol = %frame.symbol, segments, "Trend detection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantlab_core::types::{Bar, BarSeries, Interval};

    fn frame_from_closes(closes: &[f64]) -> SignalFrame {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64, c, c + 0.5, c - 0.5, c, 100.0))
            .collect();
        SignalFrame::from_series(&BarSeries::from_bars("TEST", Interval::Daily, bars))
    }

    #[test]
    fn test_monotone_series_single_bullish_segment() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 2.0).collect();
        let mut frame = frame_from_closes(&closes);

        TrendDetector::new(TrendConfig::default())
            .unwrap()
            .detect(&mut frame)
            .unwrap();

        for row in &frame.rows {
            assert_eq!(row.trend_id, Some(0));
            assert_eq!(row.trend_direction, Some(TrendDirection::Bullish));
            assert!((row.trend_slope.unwrap() - 2.0).abs() < 1e-9);
            assert!((row.trend_r_squared.unwrap() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_peak_splits_segments() {
        let mut closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64 * 3.0).collect();
        closes.extend((1..15).map(|i| 142.0 - i as f64 * 3.0));
        let mut frame = frame_from_closes(&closes);

        TrendDetector::new(TrendConfig::default())
            .unwrap()
            .detect(&mut frame)
            .unwrap();

        assert_eq!(frame.rows[0].trend_direction, Some(TrendDirection::Bullish));
        let last = frame.rows.last().unwrap();
        assert_eq!(last.trend_direction, Some(TrendDirection::Bearish));
        assert!(last.trend_id.unwrap() > 0);
        // The shared pivot bar belongs to the later segment
        assert_eq!(frame.rows[14].trend_id, last.trend_id);
    }

    #[test]
    fn test_empty_and_single_bar() {
        let detector = TrendDetector::new(TrendConfig::default()).unwrap();

        let mut empty = frame_from_closes(&[]);
        detector.detect(&mut empty).unwrap();
        assert!(empty.is_empty());

        let mut single = frame_from_closes(&[100.0]);
        detector.detect(&mut single).unwrap();
        assert!(single.rows[0].trend_id.is_none());
    }
}
