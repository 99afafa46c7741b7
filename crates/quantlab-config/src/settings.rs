//! Configuration structures.

use quantlab_core::error::LabError;
use quantlab_labeling::LabelingConfig;
use quantlab_signals::SignalsConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub labeling: LabelingConfig,
}

impl AppConfig {
    /// Check every section.
    pub fn validate(&self) -> Result<(), LabError> {
        self.logging.validate()?;
        self.data.validate()?;
        self.signals.validate()?;
        self.labeling.validate()?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, LabError> {
        toml::to_string_pretty(self).map_err(|e| LabError::Serialization(e.to_string()))
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "quantlab".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Optional log file, written in addition to the console
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), LabError> {
        match self.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(LabError::Config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                other
            ))),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

/// Archive acquisition and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Root of the local archive mirror
    pub download_dir: String,
    /// SQLite database file
    pub db_path: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub total_retries: u32,
    pub backoff_factor: f64,
    pub max_concurrent_downloads: usize,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            download_dir: "data/raw".to_string(),
            db_path: "data/quantlab.db".to_string(),
            base_url: "https://data.binance.vision/data/spot/daily/".to_string(),
            timeout_secs: 10,
            total_retries: 3,
            backoff_factor: 0.5,
            max_concurrent_downloads: 4,
        }
    }
}

impl DataSettings {
    pub fn validate(&self) -> Result<(), LabError> {
        if self.base_url.trim().is_empty() {
            return Err(LabError::Config("data.base_url must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(LabError::Config("data.timeout_secs must be positive".into()));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            return Err(LabError::Config(
                "data.backoff_factor must be a finite, non-negative number".into(),
            ));
        }
        if self.max_concurrent_downloads == 0 {
            return Err(LabError::Config(
                "data.max_concurrent_downloads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_sections() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(config.validate(), Err(LabError::Config(_))));

        let mut config = AppConfig::default();
        config.labeling.profit_factors.clear();
        assert!(matches!(config.validate(), Err(LabError::Validation(_))));

        let mut config = AppConfig::default();
        config.data.backoff_factor = f64::NAN;
        assert!(matches!(config.validate(), Err(LabError::Config(_))));

        let mut config = AppConfig::default();
        config.signals.trend.pivot_legs = 0;
        assert!(matches!(config.validate(), Err(LabError::Detector(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let rendered = AppConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[signals.key_candle]"));

        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.data.db_path, "data/quantlab.db");
        assert_eq!(parsed.signals, SignalsConfig::default());
    }
}
