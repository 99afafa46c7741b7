//! Volatility indicators.

use quantlab_core::traits::OhlcIndicator;

/// True range of bar `i` given the previous close.
#[inline]
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// Average True Range with Wilder smoothing.
///
/// Barrier widths in the labeling engine and the height limit of
/// accumulation zones are both expressed in ATRs.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "ATR period must be at least 1");
        Self { period }
    }

    /// One ATR value per bar; `None` until bar `period`.
    pub fn per_bar(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<Option<f64>> {
        self.aligned_hlc(high, low, close)
    }
}

impl OhlcIndicator for Atr {
    type Output = f64;

    /// True range starts at bar 1, so the seed (mean of the first `period`
    /// true ranges) lands on bar `period`.
    fn calculate_hlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let len = high.len().min(low.len()).min(close.len());
        if len <= self.period {
            return Vec::new();
        }

        let ranges: Vec<f64> = (1..len)
            .map(|i| true_range(high[i], low[i], close[i - 1]))
            .collect();

        let n = self.period as f64;
        let mut atr = ranges[..self.period].iter().sum::<f64>() / n;
        let mut out = Vec::with_capacity(ranges.len() - self.period + 1);
        out.push(atr);
        for tr in &ranges[self.period..] {
            atr += (tr - atr) / n;
            out.push(atr);
        }
        out
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "ATR"
    }
}
