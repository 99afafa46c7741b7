//! Event labeling.
//!
//! Events (bar timestamps) are labelled with the triple-barrier method:
//! several ATR-scaled take-profit levels, an ATR-scaled stop loss and a
//! time limit, plus a drawdown filter that neutralises stops hit after most
//! of an open gain was given back.

mod engine;
mod report;
mod statistics;

pub use engine::{EventLabel, LabelingConfig, Outcome, PotentialCaptureEngine};
pub use report::LabelReport;
pub use statistics::LabelStats;
