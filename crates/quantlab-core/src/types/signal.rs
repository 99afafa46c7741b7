//! Annotated bar frames produced by the signal detectors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Bar, BarSeries, Interval};

/// Direction of a fitted trend segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Bullish,
    Bearish,
}

impl TrendDirection {
    /// Classify a regression slope. A flat slope counts as bearish.
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Bullish
        } else {
            TrendDirection::Bearish
        }
    }
}

/// One bar plus every annotation the detectors can attach to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub bar: Bar,

    // Key candle detector
    pub volume_threshold: Option<f64>,
    pub body_size: f64,
    pub body_percentage: f64,
    pub is_key_candle: bool,

    // Accumulation zone detector
    pub in_accumulation_zone: bool,
    pub zone_id: Option<usize>,

    // Trend detector
    pub trend_id: Option<usize>,
    pub trend_direction: Option<TrendDirection>,
    pub trend_slope: Option<f64>,
    pub trend_r_squared: Option<f64>,

    // Combiner and scorer
    pub is_triple_coincidence: bool,
    pub final_score: Option<f64>,
}

impl SignalRow {
    pub fn new(bar: Bar) -> Self {
        Self {
            bar,
            volume_threshold: None,
            body_size: 0.0,
            body_percentage: 0.0,
            is_key_candle: false,
            in_accumulation_zone: false,
            zone_id: None,
            trend_id: None,
            trend_direction: None,
            trend_slope: None,
            trend_r_squared: None,
            is_triple_coincidence: false,
            final_score: None,
        }
    }
}

/// Time-ordered annotated bars for one symbol and interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFrame {
    pub symbol: String,
    pub interval: Interval,
    pub rows: Vec<SignalRow>,
}

impl SignalFrame {
    /// Create an empty frame.
    pub fn empty(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            rows: Vec::new(),
        }
    }

    /// Wrap a bar series, one unannotated row per bar.
    pub fn from_series(series: &BarSeries) -> Self {
        Self {
            symbol: series.symbol.clone(),
            interval: series.interval,
            rows: series.iter().copied().map(SignalRow::new).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn bars(&self) -> impl Iterator<Item = &Bar> {
        self.rows.iter().map(|r| &r.bar)
    }

    pub fn highs(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.bar.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.bar.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.bar.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.bar.volume).collect()
    }

    /// Indices of rows flagged as key candles.
    pub fn key_candle_indices(&self) -> Vec<usize> {
        self.indices_where(|r| r.is_key_candle)
    }

    /// Indices of rows flagged as triple coincidences.
    pub fn triple_coincidence_indices(&self) -> Vec<usize> {
        self.indices_where(|r| r.is_triple_coincidence)
    }

    /// Indices of rows matching a predicate.
    pub fn indices_where(&self, predicate: impl Fn(&SignalRow) -> bool) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| predicate(r))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Feature summary of one detected accumulation zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationZone {
    pub zone_id: usize,
    pub start_idx: usize,
    pub end_idx: usize,
    pub high: f64,
    pub low: f64,
    pub volume_avg: f64,
    pub vol_total: f64,
    pub vwap: f64,
    /// Point of control: typical price of the highest-volume bar
    pub poc: f64,
    /// Money flow index over the zone
    pub mfi: f64,
    pub quality_score: f64,
    pub datetime_start: DateTime<Utc>,
    pub datetime_end: DateTime<Utc>,
}

impl AccumulationZone {
    /// Number of bars spanned by the zone.
    pub fn bars(&self) -> usize {
        self.end_idx - self.start_idx + 1
    }

    /// Height of the zone (high - low).
    pub fn height(&self) -> f64 {
        self.high - self.low
    }
}
