//! Label statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::{EventLabel, Outcome};

/// Outcome counts over a set of labelled events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelStats {
    /// Number of labelled events
    pub total: usize,
    /// Events reaching any take-profit level
    pub take_profits: usize,
    /// Take-profit count per level (1-based)
    pub take_profit_levels: BTreeMap<usize, usize>,
    pub stop_losses: usize,
    pub drawdown_filtered: usize,
    pub time_limits: usize,
    pub no_volatility: usize,
    /// Take profits over decided events (take profits plus stop losses)
    pub hit_rate: f64,
    /// Mean ordinal label
    pub mean_label: f64,
    /// Mean bars from event to barrier, over events that hit one
    pub avg_bars_to_exit: f64,
}

impl LabelStats {
    /// Compute statistics over labels.
    pub fn from_labels(labels: &[EventLabel]) -> Self {
        let mut stats = Self {
            total: labels.len(),
            ..Default::default()
        };

        let mut exit_bars = 0usize;
        let mut exits = 0usize;

        for label in labels {
            match label.outcome {
                Outcome::TakeProfit(level) => {
                    stats.take_profits += 1;
                    *stats.take_profit_levels.entry(level).or_default() += 1;
                }
                Outcome::StopLoss => stats.stop_losses += 1,
                Outcome::DrawdownFiltered => stats.drawdown_filtered += 1,
                Outcome::TimeLimit => stats.time_limits += 1,
                Outcome::NoVolatility => stats.no_volatility += 1,
            }

            if let Some(exit) = label.exit_index {
                exit_bars += exit - label.index;
                exits += 1;
            }
        }

        let decided = stats.take_profits + stats.stop_losses;
        if decided > 0 {
            stats.hit_rate = stats.take_profits as f64 / decided as f64;
        }
        if !labels.is_empty() {
            stats.mean_label =
                labels.iter().map(|l| l.label() as f64).sum::<f64>() / labels.len() as f64;
        }
        if exits > 0 {
            stats.avg_bars_to_exit = exit_bars as f64 / exits as f64;
        }

        stats
    }

    /// Events with a neutral (0) label.
    pub fn neutral(&self) -> usize {
        self.drawdown_filtered + self.time_limits + self.no_volatility
    }
}
