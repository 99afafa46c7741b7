//! Signal detection.
//!
//! Detectors annotate a [`SignalFrame`](quantlab_core::types::SignalFrame)
//! in place. The default pipeline, run by [`SignalOrchestrator`], is:
//! - Accumulation zones (volume plus ATR-bounded ranges)
//! - Key candles (high volume, small body)
//! - Trend segments (ZigZag plus linear regression)
//! - Triple coincidence combiner
//! - Scorer

mod accumulation_zone;
mod combiner;
mod config;
mod key_candle;
mod orchestrator;
mod registry;
mod scorer;
mod trend;

pub use accumulation_zone::{AccumulationZoneConfig, AccumulationZoneDetector};
pub use combiner::{CombinerConfig, SignalCombiner};
pub use config::SignalsConfig;
pub use key_candle::{KeyCandleConfig, KeyCandleDetector};
pub use orchestrator::{EventKind, SignalOrchestrator};
pub use registry::{DetectorInfo, DetectorRegistry};
pub use scorer::{normalize, ScorerConfig, SignalScorer};
pub use trend::{TrendConfig, TrendDetector};
