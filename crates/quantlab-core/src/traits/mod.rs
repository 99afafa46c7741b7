//! Core traits for the research laboratory.

mod detector;
mod fetcher;
mod indicator;

pub use detector::Detector;
pub use fetcher::ArchiveFetcher;
pub use indicator::{Indicator, OhlcIndicator};
