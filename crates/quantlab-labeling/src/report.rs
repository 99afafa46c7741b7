//! Labeling report generation.

use quantlab_core::types::Interval;
use serde::{Deserialize, Serialize};

use crate::{EventLabel, LabelStats, LabelingConfig};

/// Labels for one symbol and interval with their statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelReport {
    pub symbol: String,
    pub interval: Interval,
    /// Configuration used
    pub config: LabelingConfig,
    pub stats: LabelStats,
    pub labels: Vec<EventLabel>,
}

impl LabelReport {
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        config: LabelingConfig,
        labels: Vec<EventLabel>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            stats: LabelStats::from_labels(&labels),
            config,
            labels,
        }
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                     LABELING REPORT                        \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Symbol:              {}\n", self.symbol));
        s.push_str(&format!("  Interval:            {}\n", self.interval));
        s.push_str(&format!(
            "  Profit Factors:      {:?}\n",
            self.config.profit_factors
        ));
        s.push_str(&format!(
            "  Stop Loss Factor:    {:.2}\n",
            self.config.stop_loss_factor
        ));
        s.push_str(&format!(
            "  Time Limit:          {} bars\n",
            self.config.time_limit
        ));
        s.push('\n');

        s.push_str("OUTCOMES\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Events:              {}\n", self.stats.total));
        s.push_str(&format!(
            "  Take Profit:         {}\n",
            self.stats.take_profits
        ));
        for (level, count) in &self.stats.take_profit_levels {
            s.push_str(&format!("    Level {}:           {}\n", level, count));
        }
        s.push_str(&format!(
            "  Stop Loss:           {}\n",
            self.stats.stop_losses
        ));
        s.push_str(&format!(
            "  Drawdown Filtered:   {}\n",
            self.stats.drawdown_filtered
        ));
        s.push_str(&format!(
            "  Time Limit:          {}\n",
            self.stats.time_limits
        ));
        s.push_str(&format!(
            "  No Volatility:       {}\n",
            self.stats.no_volatility
        ));
        s.push('\n');

        s.push_str("QUALITY\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!(
            "  Hit Rate:            {:.2}%\n",
            self.stats.hit_rate * 100.0
        ));
        s.push_str(&format!(
            "  Mean Label:          {:.3}\n",
            self.stats.mean_label
        ));
        s.push_str(&format!(
            "  Avg Bars to Exit:    {:.1}\n",
            self.stats.avg_bars_to_exit
        ));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export labels to CSV.
    pub fn labels_to_csv(&self) -> String {
        let mut csv = String::from("timestamp,datetime,entry_price,atr,label\n");
        for label in &self.labels {
            let datetime = chrono::DateTime::from_timestamp_millis(label.timestamp)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default();
            let atr = label.atr.map(|a| a.to_string()).unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                label.timestamp,
                datetime,
                label.entry_price,
                atr,
                label.label()
            ));
        }
        csv
    }
}
