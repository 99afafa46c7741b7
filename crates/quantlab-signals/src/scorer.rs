//! Signal scoring.

use std::collections::HashMap;

use quantlab_core::{error::DetectorError, traits::Detector, types::SignalFrame};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scale `value` linearly from `[min, max]` onto `[0, 1]`, clamped.
///
/// A degenerate range maps everything to 0.5.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.5;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Configuration for the signal scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Zone length scoring 0
    pub zone_min_bars: usize,
    /// Zone length scoring 1
    pub zone_max_bars: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            zone_min_bars: 5,
            zone_max_bars: 50,
        }
    }
}

impl ScorerConfig {
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.zone_min_bars > self.zone_max_bars {
            return Err(DetectorError::InvalidConfig(
                "zone_min_bars must not exceed zone_max_bars".into(),
            ));
        }
        Ok(())
    }
}

/// Scores triple coincidences from zone length and trend quality.
pub struct SignalScorer {
    config: ScorerConfig,
}

impl SignalScorer {
    pub fn new(config: ScorerConfig) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Score from a zone length (if any) and a trend R² (if any).
    pub fn score(&self, zone_len: Option<usize>, r_squared: Option<f64>) -> f64 {
        let zone_score = zone_len
            .map(|len| {
                normalize(
                    len as f64,
                    self.config.zone_min_bars as f64,
                    self.config.zone_max_bars as f64,
                )
            })
            .unwrap_or(0.0);
        let trend_score = r_squared.unwrap_or(0.0);
        0.5 * zone_score + 0.5 * trend_score
    }
}

impl Detector for SignalScorer {
    fn name(&self) -> &str {
        "signal_scorer"
    }

    fn description(&self) -> &str {
        "Scores triple coincidences by zone length and trend R²"
    }

    fn detect(&self, frame: &mut SignalFrame) -> Result<(), DetectorError> {
        let mut zone_lengths: HashMap<usize, usize> = HashMap::new();
        for zone_id in frame.rows.iter().filter_map(|r| r.zone_id) {
            *zone_lengths.entry(zone_id).or_default() += 1;
        }

        let mut scored = 0;
        for row in &mut frame.rows {
            row.final_score = if row.is_triple_coincidence {
                scored += 1;
                let zone_len = row.zone_id.and_then(|id| zone_lengths.get(&id).copied());
                Some(self.score(zone_len, row.trend_r_squared))
            } else {
                None
            };
        }

        debug!(symbol = %frame.symbol, scored, "Signal scoring");
        Ok(())
    }
}
