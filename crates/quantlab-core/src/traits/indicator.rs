//! Indicator trait definitions.

use crate::error::IndicatorError;

/// Trait for technical indicators over a single input series.
///
/// Outputs are produced for full windows only, so the first output lines up
/// with input index `period() - 1` unless the indicator documents otherwise.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Values for every full window of `data` (prices or volumes).
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        if data.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            });
        }
        Ok(())
    }

    /// Calculate and pad the front with `None` so the output has one entry
    /// per input point.
    fn aligned(&self, data: &[f64]) -> Vec<Option<Self::Output>> {
        let values = self.calculate(data);
        let mut out: Vec<Option<Self::Output>> = Vec::with_capacity(data.len());
        out.resize_with(data.len().saturating_sub(values.len()), || None);
        out.extend(values.into_iter().map(Some));
        out
    }
}

/// Indicator that needs high, low and close series (e.g. ATR).
pub trait OhlcIndicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Values from parallel high, low and close series.
    fn calculate_hlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Calculate and pad the front with `None` to one entry per bar.
    fn aligned_hlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<Option<Self::Output>> {
        let len = high.len().min(low.len()).min(close.len());
        let values = self.calculate_hlc(high, low, close);
        let mut out: Vec<Option<Self::Output>> = Vec::with_capacity(len);
        out.resize_with(len.saturating_sub(values.len()), || None);
        out.extend(values.into_iter().map(Some));
        out
    }
}
