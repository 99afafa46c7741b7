//! Kline interval definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Kline interval as published by the Binance Vision archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Interval {
    /// 1 minute bars
    #[serde(rename = "1m")]
    Minute1,
    /// 5 minute bars
    #[serde(rename = "5m")]
    Minute5,
    /// 15 minute bars
    #[serde(rename = "15m")]
    Minute15,
    /// 1 hour bars
    #[serde(rename = "1h")]
    Hour1,
    /// 4 hour bars
    #[serde(rename = "4h")]
    Hour4,
    /// Daily bars
    #[serde(rename = "1d")]
    #[default]
    Daily,
    /// Weekly bars
    #[serde(rename = "1w")]
    Weekly,
    /// Monthly bars
    #[serde(rename = "1M")]
    Monthly,
}

impl Interval {
    /// Get the nominal duration of the interval in seconds.
    pub fn as_secs(&self) -> u64 {
        match self {
            Interval::Minute1 => 60,
            Interval::Minute5 => 300,
            Interval::Minute15 => 900,
            Interval::Hour1 => 3600,
            Interval::Hour4 => 14400,
            Interval::Daily => 86400,
            Interval::Weekly => 604800,
            Interval::Monthly => 2592000, // Approximate (30 days)
        }
    }

    /// Get the nominal duration of the interval in milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.as_secs() * 1000
    }

    /// Token used in archive paths and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Hour1 => "1h",
            Interval::Hour4 => "4h",
            Interval::Daily => "1d",
            Interval::Weekly => "1w",
            Interval::Monthly => "1M",
        }
    }

    /// Get all available intervals.
    pub fn all() -> &'static [Interval] {
        &[
            Interval::Minute1,
            Interval::Minute5,
            Interval::Minute15,
            Interval::Hour1,
            Interval::Hour4,
            Interval::Daily,
            Interval::Weekly,
            Interval::Monthly,
        ]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "1M" and "1m" differ only by case, so exact tokens are matched first.
        if let Some(interval) = Interval::all().iter().find(|i| i.as_str() == s) {
            return Ok(*interval);
        }

        match s.to_lowercase().as_str() {
            "1min" | "minute" => Ok(Interval::Minute1),
            "5min" => Ok(Interval::Minute5),
            "15min" => Ok(Interval::Minute15),
            "1hour" | "hour" => Ok(Interval::Hour1),
            "4hour" => Ok(Interval::Hour4),
            "day" | "daily" => Ok(Interval::Daily),
            "week" | "weekly" => Ok(Interval::Weekly),
            "month" | "monthly" => Ok(Interval::Monthly),
            _ => Err(DataError::InvalidInterval(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_duration() {
        assert_eq!(Interval::Minute1.as_secs(), 60);
        assert_eq!(Interval::Hour1.as_secs(), 3600);
        assert_eq!(Interval::Daily.as_millis(), 86_400_000);
    }

    #[test]
    fn test_interval_parse() {
        assert_eq!(Interval::from_str("1m").unwrap(), Interval::Minute1);
        assert_eq!(Interval::from_str("1M").unwrap(), Interval::Monthly);
        assert_eq!(Interval::from_str("1d").unwrap(), Interval::Daily);
        assert_eq!(Interval::from_str("daily").unwrap(), Interval::Daily);
        assert!(Interval::from_str("30m").is_err());
    }

    #[test]
    fn test_interval_display_roundtrip() {
        for interval in Interval::all() {
            assert_eq!(Interval::from_str(&interval.to_string()).unwrap(), *interval);
        }
    }

    #[test]
    fn test_interval_serde_tokens() {
        assert_eq!(serde_json::to_string(&Interval::Monthly).unwrap(), "\"1M\"");
        let parsed: Interval = serde_json::from_str("\"4h\"").unwrap();
        assert_eq!(parsed, Interval::Hour4);
    }
}
