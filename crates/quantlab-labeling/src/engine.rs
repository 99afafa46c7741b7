//! Potential capture labeling engine.

use std::collections::HashSet;

use quantlab_core::error::LabError;
use quantlab_core::types::{Bar, BarSeries};
use quantlab_indicators::Atr;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Labeling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingConfig {
    /// Take-profit distances in ATRs; level k uses the k-th smallest
    pub profit_factors: Vec<f64>,
    /// Stop-loss distance in ATRs
    pub stop_loss_factor: f64,
    /// Maximum bars an event is followed
    pub time_limit: usize,
    /// Share of the open gain lost at the stop that neutralises the label
    pub drawdown_threshold: f64,
    pub atr_period: usize,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            profit_factors: vec![1.0, 2.0, 3.0],
            stop_loss_factor: 1.0,
            time_limit: 20,
            drawdown_threshold: 0.8,
            atr_period: 14,
        }
    }
}

impl LabelingConfig {
    pub fn validate(&self) -> Result<(), LabError> {
        if self.profit_factors.is_empty() {
            return Err(LabError::Validation(
                "At least one profit factor required".into(),
            ));
        }
        if self.profit_factors.iter().any(|pf| !pf.is_finite() || *pf <= 0.0) {
            return Err(LabError::Validation(
                "Profit factors must be positive".into(),
            ));
        }
        if self.stop_loss_factor <= 0.0 {
            return Err(LabError::Validation(
                "stop_loss_factor must be positive".into(),
            ));
        }
        if self.time_limit == 0 || self.atr_period == 0 {
            return Err(LabError::Validation(
                "time_limit and atr_period must be at least 1".into(),
            ));
        }
        if self.drawdown_threshold <= 0.0 {
            return Err(LabError::Validation(
                "drawdown_threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// How an event's path resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Highest take-profit level reached (1-based)
    TakeProfit(usize),
    StopLoss,
    /// Stop hit after giving back most of the open gain
    DrawdownFiltered,
    TimeLimit,
    /// ATR missing or zero at the event
    NoVolatility,
}

impl Outcome {
    /// Ordinal label: k for take-profit level k, -1 for a stop, 0 otherwise.
    pub fn label(&self) -> i32 {
        match self {
            Outcome::TakeProfit(level) => *level as i32,
            Outcome::StopLoss => -1,
            Outcome::DrawdownFiltered | Outcome::TimeLimit | Outcome::NoVolatility => 0,
        }
    }
}

/// Label for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLabel {
    /// Bar index of the event
    pub index: usize,
    /// Event timestamp, Unix milliseconds
    pub timestamp: i64,
    pub entry_price: f64,
    pub atr: Option<f64>,
    pub outcome: Outcome,
    /// Bar at which a barrier was hit
    pub exit_index: Option<usize>,
}

impl EventLabel {
    pub fn label(&self) -> i32 {
        self.outcome.label()
    }
}

/// Triple-barrier labeler with multiple take-profit levels.
pub struct PotentialCaptureEngine {
    config: LabelingConfig,
}

impl PotentialCaptureEngine {
    /// Create an engine. Profit factors are sorted ascending.
    pub fn new(mut config: LabelingConfig) -> Result<Self, LabError> {
        config.validate()?;
        config.profit_factors.sort_by(|a, b| a.total_cmp(b));
        Ok(Self { config })
    }

    pub fn config(&self) -> &LabelingConfig {
        &self.config
    }

    /// Label every event timestamp present in `series`.
    ///
    /// Duplicate events are labelled once; timestamps that are not bars are
    /// dropped. Labels keep the order of first appearance.
    pub fn label_events(&self, series: &BarSeries, events: &[i64]) -> Vec<EventLabel> {
        let bars = series.bars();
        let atr = Atr::new(self.config.atr_period).per_bar(
            &series.highs(),
            &series.lows(),
            &series.closes(),
        );

        let mut seen = HashSet::new();
        let labels: Vec<EventLabel> = events
            .iter()
            .filter(|ts| seen.insert(**ts))
            .filter_map(|&ts| series.position_of(ts))
            .map(|index| self.label_one(bars, index, atr[index]))
            .collect();

        info!(
            symbol = %series.symbol,
            events = events.len(),
            labelled = labels.len(),
            "Labelled events"
        );
        labels
    }

    fn label_one(&self, bars: &[Bar], event: usize, atr: Option<f64>) -> EventLabel {
        let entry = bars[event].close;
        let mut label = EventLabel {
            index: event,
            timestamp: bars[event].timestamp,
            entry_price: entry,
            atr,
            outcome: Outcome::TimeLimit,
            exit_index: None,
        };

        let atr = match atr {
            Some(a) if a > 0.0 => a,
            _ => {
                label.outcome = Outcome::NoVolatility;
                return label;
            }
        };

        let stop = entry - atr * self.config.stop_loss_factor;
        let targets: Vec<f64> = self
            .config
            .profit_factors
            .iter()
            .map(|pf| entry + atr * pf)
            .collect();

        let last = (event + self.config.time_limit).min(bars.len() - 1);
        let mut peak = bars[event].high;

        for (t, bar) in bars.iter().enumerate().take(last + 1).skip(event + 1) {
            peak = peak.max(bar.high);

            if let Some(level) = targets.iter().rposition(|tp| bar.high >= *tp) {
                label.outcome = Outcome::TakeProfit(level + 1);
                label.exit_index = Some(t);
                break;
            }

            if bar.low <= stop {
                let gain = peak - entry;
                let drawdown = if gain > 0.0 {
                    (peak - bar.low) / gain
                } else {
                    0.0
                };
                label.outcome = if drawdown >= self.config.drawdown_threshold {
                    Outcome::DrawdownFiltered
                } else {
                    Outcome::StopLoss
                };
                label.exit_index = Some(t);
                break;
            }
        }

        debug!(index = event, outcome = ?label.outcome, "Event labelled");
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantlab_core::types::Interval;

    /// Bars with range 10 around a close of 100; ATR settles at exactly 10.
    fn flat_series(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar::new(i as i64 * 1000, 100.0, 105.0, 95.0, 100.0, 1000.0))
            .collect()
    }

    fn series(bars: Vec<Bar>) -> BarSeries {
        BarSeries::from_bars("TEST", Interval::Daily, bars)
    }

    fn engine() -> PotentialCaptureEngine {
        PotentialCaptureEngine::new(LabelingConfig::default()).unwrap()
    }

    fn label_at(bars: Vec<Bar>, event: usize) -> EventLabel {
        let ts = bars[event].timestamp;
        engine()
            .label_events(&series(bars), &[ts])
            .pop()
            .unwrap()
    }

    #[test]
    fn test_take_profit_first_level() {
        let mut bars = flat_series(45);
        bars[21].high = 112.0;

        let label = label_at(bars, 20);
        assert_eq!(label.atr, Some(10.0));
        assert_eq!(label.outcome, Outcome::TakeProfit(1));
        assert_eq!(label.label(), 1);
        assert_eq!(label.exit_index, Some(21));
    }

    #[test]
    fn test_highest_level_wins_on_same_bar() {
        let mut bars = flat_series(45);
        bars[21].high = 135.0;
        bars[21].low = 80.0;

        assert_eq!(label_at(bars, 20).label(), 3);
    }

    #[test]
    fn test_time_limit() {
        let label = label_at(flat_series(45), 20);
        assert_eq!(label.outcome, Outcome::TimeLimit);
        assert_eq!(label.label(), 0);
        assert_eq!(label.exit_index, None);
    }

    #[test]
    fn test_clean_stop_loss() {
        let mut bars = flat_series(45);
        // No gain before the stop: the event bar and the stop bar top at entry
        bars[20].high = 100.0;
        bars[21].high = 100.0;
        bars[21].low = 89.0;

        let label = label_at(bars, 20);
        assert_eq!(label.outcome, Outcome::StopLoss);
        assert_eq!(label.label(), -1);
    }

    #[test]
    fn test_stop_after_large_drawdown_is_neutral() {
        let mut bars = flat_series(45);
        bars[21].high = 108.0;
        bars[21].low = 97.0;
        bars[22].high = 100.0;
        bars[22].low = 89.0;

        let label = label_at(bars, 20);
        assert_eq!(label.outcome, Outcome::DrawdownFiltered);
        assert_eq!(label.label(), 0);
        assert_eq!(label.exit_index, Some(22));
    }

    #[test]
    fn test_no_volatility() {
        let label = label_at(flat_series(45), 5);
        assert_eq!(label.outcome, Outcome::NoVolatility);

        let flat: Vec<Bar> = (0..30)
            .map(|i| Bar::new(i * 1000, 100.0, 100.0, 100.0, 100.0, 1.0))
            .collect();
        assert_eq!(label_at(flat, 20).outcome, Outcome::NoVolatility);
    }

    #[test]
    fn test_events_deduplicated_and_filtered() {
        let bars = flat_series(45);
        let ts = bars[20].timestamp;
        let labels = engine().label_events(&series(bars), &[ts, ts, 20_500, ts]);

        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].index, 20);
    }

    #[test]
    fn test_event_on_last_bar() {
        let bars = flat_series(30);
        let label = label_at(bars, 29);
        assert_eq!(label.outcome, Outcome::TimeLimit);
    }

    #[test]
    fn test_profit_factors_sorted_and_validated() {
        let config = LabelingConfig {
            profit_factors: vec![3.0, 1.0, 2.0],
            ..Default::default()
        };
        let engine = PotentialCaptureEngine::new(config).unwrap();
        assert_eq!(engine.config().profit_factors, vec![1.0, 2.0, 3.0]);

        let empty = LabelingConfig {
            profit_factors: vec![],
            ..Default::default()
        };
        assert!(PotentialCaptureEngine::new(empty).is_err());
    }
}
