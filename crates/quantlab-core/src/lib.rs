//! Core types and traits for the research laboratory.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, Kline, Trade)
//! - Data request templates for archive downloads
//! - The annotated signal frame shared by all detectors
//! - Core traits for indicators, detectors, and archive fetchers

pub mod types;
pub mod traits;
pub mod error;

pub use error::{LabError, LabResult};
pub use types::*;
pub use traits::*;
