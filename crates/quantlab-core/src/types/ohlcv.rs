//! Candle bars and per-symbol bar series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Interval;

/// One OHLCV candle. Prices are `f64` for the indicator hot paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Open time, Unix milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Base asset volume
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// (high + low + close) / 3
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// |close - open|
    #[inline]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Body as a share of the range; a bar without range has ratio 0.
    #[inline]
    pub fn body_ratio(&self) -> f64 {
        match self.range() {
            r if r > 0.0 => self.body() / r,
            _ => 0.0,
        }
    }

    /// Open time as UTC. Out-of-range timestamps map to the epoch.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Time-ordered bars for one symbol and interval.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub symbol: String,
    pub interval: Interval,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, interval: Interval) -> Self {
        Self::from_bars(symbol, interval, Vec::new())
    }

    /// Build a series; bars are sorted by open time.
    pub fn from_bars(symbol: impl Into<String>, interval: Interval, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self {
            symbol: symbol.into(),
            interval,
            bars,
        }
    }

    /// Append a bar that opens after the current last bar.
    pub fn push(&mut self, bar: Bar) {
        debug_assert!(self.bars.last().map_or(true, |b| b.timestamp < bar.timestamp));
        self.bars.push(bar);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }

    /// Index of the bar opening exactly at `timestamp`.
    pub fn position_of(&self, timestamp: i64) -> Option<usize> {
        self.bars.binary_search_by_key(&timestamp, |b| b.timestamp).ok()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.column(|b| b.high)
    }

    pub fn lows(&self) -> Vec<f64> {
        self.column(|b| b.low)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.column(|b| b.close)
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.column(|b| b.volume)
    }

    fn column(&self, field: impl Fn(&Bar) -> f64) -> Vec<f64> {
        self.bars.iter().map(field).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_shape() {
        let bar = Bar::new(0, 100.0, 110.0, 95.0, 105.0, 1_000.0);

        assert!((bar.typical_price() - 310.0 / 3.0).abs() < 1e-12);
        assert_eq!(bar.range(), 15.0);
        assert_eq!(bar.body(), 5.0);
        assert!((bar.body_ratio() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_doji_without_range() {
        let bar = Bar::new(0, 42.0, 42.0, 42.0, 42.0, 10.0);
        assert_eq!(bar.body_ratio(), 0.0);
    }

    #[test]
    fn test_datetime() {
        let bar = Bar::new(1_672_531_200_000, 1.0, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(bar.datetime().to_rfc3339(), "2023-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_series_sorted_and_positions() {
        let bar = |ts| Bar::new(ts, 1.0, 2.0, 0.5, 1.5, ts as f64);
        let series = BarSeries::from_bars("BTCUSDT", Interval::Daily, vec![bar(3), bar(1), bar(2)]);

        assert_eq!(series.bars()[0].timestamp, 1);
        assert_eq!(series.position_of(3), Some(2));
        assert_eq!(series.position_of(4), None);
        assert_eq!(series.volumes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.highs(), vec![2.0; 3]);
    }

    #[test]
    fn test_push() {
        let mut series = BarSeries::new("ETHUSDT", Interval::Hour1);
        series.push(Bar::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0));
        series.push(Bar::new(2, 100.5, 102.0, 100.0, 101.5, 2000.0));

        assert_eq!(series.closes(), vec![100.5, 101.5]);
        assert_eq!(series.lows(), vec![99.0, 100.0]);
    }
}
