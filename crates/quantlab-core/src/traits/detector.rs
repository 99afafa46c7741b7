//! Detector trait definitions.

use crate::error::DetectorError;
use crate::types::SignalFrame;

/// A pipeline stage that annotates a [`SignalFrame`] in place.
///
/// Detectors run in sequence; later stages may read annotations written by
/// earlier ones (the combiner reads zones, key candles and trends).
pub trait Detector: Send + Sync {
    /// Registry key of the detector.
    fn name(&self) -> &str;

    /// Annotate the frame.
    fn detect(&self, frame: &mut SignalFrame) -> Result<(), DetectorError>;

    /// Bars needed before the detector can flag anything.
    fn warmup_period(&self) -> usize {
        0
    }

    /// Get a description of the detector.
    fn description(&self) -> &str {
        ""
    }
}
