//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::{AccumulationZoneConfig, CombinerConfig, KeyCandleConfig, ScorerConfig, TrendConfig};
use quantlab_core::error::DetectorError;

/// Settings for every stage of the signal pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalsConfig {
    pub accumulation_zone: AccumulationZoneConfig,
    pub key_candle: KeyCandleConfig,
    pub trend: TrendConfig,
    pub combiner: CombinerConfig,
    pub scorer: ScorerConfig,
    /// Bar series kept in memory between runs
    pub cache_entries: usize,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            accumulation_zone: AccumulationZoneConfig::default(),
            key_candle: KeyCandleConfig::default(),
            trend: TrendConfig::default(),
            combiner: CombinerConfig::default(),
            scorer: ScorerConfig::default(),
            cache_entries: 16,
        }
    }
}

impl SignalsConfig {
    pub fn validate(&self) -> Result<(), DetectorError> {
        self.accumulation_zone.validate()?;
        self.key_candle.validate()?;
        self.trend.validate()?;
        self.combiner.validate()?;
        self.scorer.validate()?;
        Ok(())
    }
}
