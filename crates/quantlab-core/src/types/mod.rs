//! Core data types for the research laboratory.

mod interval;
mod kline;
mod ohlcv;
mod request;
mod signal;

pub use interval::Interval;
pub use kline::{Kline, Trade};
pub use ohlcv::{Bar, BarSeries};
pub use request::{DataKind, DataRequest, KlinesRequest, TradesRequest};
pub use signal::{AccumulationZone, SignalFrame, SignalRow, TrendDirection};
