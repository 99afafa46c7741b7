//! Detector registry for building pipeline stages by name.

use crate::{
    AccumulationZoneConfig, AccumulationZoneDetector, CombinerConfig, KeyCandleConfig,
    KeyCandleDetector, ScorerConfig, SignalCombiner, SignalScorer, TrendConfig, TrendDetector,
};
use quantlab_core::{error::DetectorError, traits::Detector};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Information about a registered detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorInfo {
    /// Registry key
    pub name: String,
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
    /// Position in the default pipeline
    pub stage: usize,
}

/// Registry of the built-in detectors.
pub struct DetectorRegistry {
    detectors: BTreeMap<String, DetectorInfo>,
}

impl DetectorRegistry {
    /// Registry with every built-in detector.
    pub fn new() -> Self {
        let mut registry = Self {
            detectors: BTreeMap::new(),
        };

        registry.register(
            "accumulation_zone",
            "High-volume ranges whose height stays within a multiple of ATR",
            &AccumulationZoneConfig::default(),
        );
        registry.register(
            "key_candle",
            "High-volume bars with a small body relative to their range",
            &KeyCandleConfig::default(),
        );
        registry.register(
            "trend",
            "ZigZag segments scored by linear regression slope and R²",
            &TrendConfig::default(),
        );
        registry.register(
            "signal_combiner",
            "Key candles near an accumulation zone inside a well-fitted trend",
            &CombinerConfig::default(),
        );
        registry.register(
            "signal_scorer",
            "Scores triple coincidences by zone length and trend R²",
            &ScorerConfig::default(),
        );

        registry
    }

    fn register(&mut self, name: &str, description: &str, config: &impl Serialize) {
        let stage = self.detectors.len();
        self.detectors.insert(
            name.to_string(),
            DetectorInfo {
                name: name.to_string(),
                description: description.to_string(),
                default_config: serde_json::to_value(config).unwrap_or_default(),
                stage,
            },
        );
    }

    /// All detectors in pipeline order.
    pub fn list(&self) -> Vec<&DetectorInfo> {
        let mut infos: Vec<&DetectorInfo> = self.detectors.values().collect();
        infos.sort_by_key(|info| info.stage);
        infos
    }

    pub fn get(&self, name: &str) -> Option<&DetectorInfo> {
        self.detectors.get(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.detectors.contains_key(name)
    }

    /// Detector names in pipeline order.
    pub fn names(&self) -> Vec<&str> {
        self.list().into_iter().map(|info| info.name.as_str()).collect()
    }

    /// Build a detector from a JSON configuration. Missing fields take
    /// their defaults.
    pub fn create(
        &self,
        name: &str,
        config: serde_json::Value,
    ) -> Result<Box<dyn Detector>, DetectorError> {
        match name {
            "accumulation_zone" => Ok(Box::new(AccumulationZoneDetector::new(parse(config)?)?)),
            "key_candle" => Ok(Box::new(KeyCandleDetector::new(parse(config)?)?)),
            "trend" => Ok(Box::new(TrendDetector::new(parse(config)?)?)),
            "signal_combiner" => Ok(Box::new(SignalCombiner::new(parse(config)?)?)),
            "signal_scorer" => Ok(Box::new(SignalScorer::new(parse(config)?)?)),
            _ => Err(DetectorError::NotFound(name.to_string())),
        }
    }

    /// Build a detector with its default configuration.
    pub fn create_default(&self, name: &str) -> Result<Box<dyn Detector>, DetectorError> {
        let info = self
            .get(name)
            .ok_or_else(|| DetectorError::NotFound(name.to_string()))?;
        self.create(name, info.default_config.clone())
    }
}

fn parse<T: DeserializeOwned>(config: serde_json::Value) -> Result<T, DetectorError> {
    serde_json::from_value(config).map_err(|e| DetectorError::InvalidConfig(e.to_string()))
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_list_in_pipeline_order() {
        let registry = DetectorRegistry::new();

        assert_eq!(
            registry.names(),
            vec![
                "accumulation_zone",
                "key_candle",
                "trend",
                "signal_combiner",
                "signal_scorer"
            ]
        );
    }

    #[test]
    fn test_registry_get() {
        let registry = DetectorRegistry::new();

        let info = registry.get("key_candle").unwrap();
        assert_eq!(info.default_config["volume_lookback"], 20);
        assert!(registry.get("unknown").is_none());
        assert!(registry.exists("trend"));
    }

    #[test]
    fn test_create_default() {
        let registry = DetectorRegistry::new();

        for name in registry.names() {
            let detector = registry.create_default(name).unwrap();
            assert_eq!(detector.name(), name);
        }
    }

    #[test]
    fn test_create_with_partial_config() {
        let registry = DetectorRegistry::new();

        let detector = registry
            .create("trend", serde_json::json!({"pivot_legs": 5}))
            .unwrap();
        assert_eq!(detector.warmup_period(), 11);
    }

    #[test]
    fn test_create_invalid() {
        let registry = DetectorRegistry::new();

        assert!(matches!(
            registry.create_default("unknown"),
            Err(DetectorError::NotFound(_))
        ));
        assert!(matches!(
            registry.create("key_candle", serde_json::json!({"volume_lookback": 0})),
            Err(DetectorError::InvalidConfig(_))
        ));
        assert!(matches!(
            registry.create("key_candle", serde_json::json!({"volume_lookback": "many"})),
            Err(DetectorError::InvalidConfig(_))
        ));
    }
}
