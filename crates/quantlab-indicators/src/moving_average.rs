//! Rolling mean.

use quantlab_core::traits::Indicator;

/// Simple moving average over full windows.
///
/// Used for the volume baseline of accumulation zones: bar `i` is compared
/// against the mean of the `period` volumes ending at `i`.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be at least 1");
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let n = self.period;
        if data.len() < n {
            return Vec::new();
        }

        let mut sum: f64 = data[..n].iter().sum();
        let mut means = vec![sum / n as f64];
        means.extend(data[n..].iter().zip(data).map(|(entering, leaving)| {
            sum += entering - leaving;
            sum / n as f64
        }));
        means
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}
