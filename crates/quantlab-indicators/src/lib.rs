//! Technical indicators for signal research.
//!
//! This crate provides the indicators the detectors and the labeling engine
//! are built on:
//! - Simple moving average and rolling quantile (volume baselines)
//! - Average True Range with Wilder smoothing (volatility barriers)
//! - Least-squares linear regression (trend slope and fit quality)
//! - ZigZag swing pivots (trend segmentation)

pub mod moving_average;
pub mod quantile;
pub mod regression;
pub mod volatility;
pub mod zigzag;

pub use moving_average::Sma;
pub use quantile::RollingQuantile;
pub use regression::{linear_regression, LinearFit};
pub use volatility::{true_range, Atr};
pub use zigzag::{Pivot, PivotKind, ZigZag};
