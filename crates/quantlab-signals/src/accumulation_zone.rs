//! Accumulation zone detection.
//!
//! A zone opens on a bar whose volume clears its moving average by a margin
//! and stays open while the combined high/low range fits inside a multiple of
//! the ATR measured at the zone's first bar.

use quantlab_core::{
    error::DetectorError,
    traits::{Detector, Indicator},
    types::{AccumulationZone, SignalFrame},
};
use quantlab_indicators::{Atr, Sma};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scorer::normalize;

/// Configuration for the accumulation zone detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulationZoneConfig {
    pub atr_period: usize,
    /// Zone height limit as a multiple of the ATR at the zone start
    pub atr_multiplier: f64,
    pub min_zone_bars: usize,
    pub volume_ma_period: usize,
    /// Volume must exceed `volume_ma * volume_threshold` to open a zone
    pub volume_threshold: f64,
}

impl Default for AccumulationZoneConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            atr_multiplier: 1.5,
            min_zone_bars: 5,
            volume_ma_period: 20,
            volume_threshold: 1.1,
        }
    }
}

impl AccumulationZoneConfig {
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.atr_period == 0 || self.volume_ma_period == 0 {
            return Err(DetectorError::InvalidConfig(
                "ATR and volume MA periods must be at least 1".into(),
            ));
        }
        if self.atr_multiplier <= 0.0 {
            return Err(DetectorError::InvalidConfig(
                "atr_multiplier must be positive".into(),
            ));
        }
        if self.min_zone_bars == 0 {
            return Err(DetectorError::InvalidConfig(
                "min_zone_bars must be at least 1".into(),
            ));
        }
        if self.volume_threshold < 0.0 {
            return Err(DetectorError::InvalidConfig(
                "volume_threshold must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Open zone being tracked by the scan.
struct OpenZone {
    start: usize,
    high: f64,
    low: f64,
    max_height: f64,
}

/// Detects tight, high-volume trading ranges.
pub struct AccumulationZoneDetector {
    config: AccumulationZoneConfig,
}

impl AccumulationZoneDetector {
    pub fn new(config: AccumulationZoneConfig) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AccumulationZoneConfig {
        &self.config
    }

    /// Inclusive `(start, end)` index ranges of the zones in `frame`.
    fn scan(&self, frame: &SignalFrame) -> Vec<(usize, usize)> {
        let highs = frame.highs();
        let lows = frame.lows();
        let atr = Atr::new(self.config.atr_period).per_bar(&highs, &lows, &frame.closes());
        let volume_ma = Sma::new(self.config.volume_ma_period).aligned(&frame.volumes());

        let mut zones = Vec::new();
        let mut open: Option<OpenZone> = None;

        for (i, row) in frame.rows.iter().enumerate() {
            let (Some(atr_now), Some(vol_ma)) = (atr[i], volume_ma[i]) else {
                continue;
            };

            if let Some(zone) = open.as_mut() {
                let high = zone.high.max(row.bar.high);
                let low = zone.low.min(row.bar.low);

                if high - low > zone.max_height {
                    let end = i - 1;
                    if end + 1 - zone.start >= self.config.min_zone_bars {
                        zones.push((zone.start, end));
                    }
                    open = None;
                } else {
                    zone.high = high;
                    zone.low = low;
                }
            }

            if open.is_none() && row.bar.volume > vol_ma * self.config.volume_threshold {
                open = Some(OpenZone {
                    start: i,
                    high: row.bar.high,
                    low: row.bar.low,
                    max_height: atr_now * self.config.atr_multiplier,
                });
            }
        }

        if let Some(zone) = open {
            if frame.len() - zone.start >= self.config.min_zone_bars {
                zones.push((zone.start, frame.len() - 1));
            }
        }

        zones
    }

    /// Summarise every zone marked on `frame`.
    pub fn zones(&self, frame: &SignalFrame) -> Vec<AccumulationZone> {
        let mut summaries = Vec::new();
        let mut i = 0;

        while i < frame.len() {
            let Some(zone_id) = frame.rows[i].zone_id else {
                i += 1;
                continue;
            };
            let start = i;
            while i + 1 < frame.len() && frame.rows[i + 1].zone_id == Some(zone_id) {
                i += 1;
            }
            summaries.push(self.summarise(frame, zone_id, start, i));
            i += 1;
        }

        summaries
    }

    fn summarise(&self, frame: &SignalFrame, zone_id: usize, start: usize, end: usize) -> AccumulationZone {
        let rows = &frame.rows[start..=end];
        let count = rows.len() as f64;

        let high = rows.iter().map(|r| r.bar.high).fold(f64::MIN, f64::max);
        let low = rows.iter().map(|r| r.bar.low).fold(f64::MAX, f64::min);
        let vol_total: f64 = rows.iter().map(|r| r.bar.volume).sum();
        let price_volume: f64 = rows
            .iter()
            .map(|r| r.bar.typical_price() * r.bar.volume)
            .sum();
        let vwap = if vol_total > 0.0 {
            price_volume / vol_total
        } else {
            rows.iter().map(|r| r.bar.typical_price()).sum::<f64>() / count
        };

        let poc = rows
            .iter()
            .max_by(|a, b| a.bar.volume.total_cmp(&b.bar.volume))
            .map(|r| r.bar.typical_price())
            .unwrap_or(vwap);

        AccumulationZone {
            zone_id,
            start_idx: start,
            end_idx: end,
            high,
            low,
            volume_avg: vol_total / count,
            vol_total,
            vwap,
            poc,
            mfi: money_flow_index(rows.iter().map(|r| (r.bar.typical_price(), r.bar.volume))),
            quality_score: normalize(rows.len() as f64, self.config.min_zone_bars as f64, 50.0),
            datetime_start: rows[0].bar.datetime(),
            datetime_end: rows[rows.len() - 1].bar.datetime(),
        }
    }
}

/// Money flow index over a sequence of `(typical_price, volume)` pairs.
fn money_flow_index(points: impl Iterator<Item = (f64, f64)>) -> f64 {
    let mut positive = 0.0;
    let mut negative = 0.0;
    let mut prev: Option<f64> = None;

    for (price, volume) in points {
        if let Some(p) = prev {
            if price > p {
                positive += price * volume;
            } else if price < p {
                negative += price * volume;
            }
        }
        prev = Some(price);
    }

    if positive + negative == 0.0 {
        50.0
    } else if negative == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + positive / negative)
    }
}

impl Detector for AccumulationZoneDetector {
    fn name(&self) -> &str {
        "accumulation_zone"
    }

    fn description(&self) -> &str {
        "High-volume ranges whose height stays within a multiple of ATR"
    }

    fn warmup_period(&self) -> usize {
        self.config.atr_period.max(self.config.volume_ma_period - 1)
    }

    fn detect(&self, frame: &mut SignalFrame) -> Result<(), DetectorError> {
        let zones = self.scan(frame);

        for (zone_id, &(start, end)) in zones.iter().enumerate() {
            for row in &mut frame.rows[start..=end] {
                row.in_accumulation_zone = true;
                row.zone_id = Some(zone_id);
            }
        }

        debug!(symbol = %frame.symbol, zones = zones.len(), "Accumulation zone detection");
        Ok(())
    }
}
