//! Rolling quantile.

use quantlab_core::traits::Indicator;

/// Rolling quantile over a fixed window.
///
/// Uses linear interpolation between the closest ranks: the quantile sits at
/// position `q * (n - 1)` of the sorted window.
#[derive(Debug, Clone)]
pub struct RollingQuantile {
    window: usize,
    q: f64,
}

impl RollingQuantile {
    /// Create a rolling quantile. `q` must lie in `[0, 1]`.
    pub fn new(window: usize, q: f64) -> Self {
        assert!(window > 0, "Window must be greater than 0");
        assert!((0.0..=1.0).contains(&q), "Quantile must be between 0 and 1");
        Self { window, q }
    }

    /// Quantile of an arbitrary sample.
    pub fn of(sample: &[f64], q: f64) -> Option<f64> {
        if sample.is_empty() {
            return None;
        }
        let mut sorted = sample.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(interpolate(&sorted, q))
    }
}

fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl Indicator for RollingQuantile {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.window {
            return vec![];
        }

        let mut scratch = Vec::with_capacity(self.window);
        data.windows(self.window)
            .map(|w| {
                scratch.clear();
                scratch.extend_from_slice(w);
                scratch.sort_by(|a, b| a.total_cmp(b));
                interpolate(&scratch, self.q)
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.window
    }

    fn name(&self) -> &str {
        "RollingQuantile"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        // sorted [1,2,3,4,5], q=0.9 -> pos 3.6 -> 4 + 0.6 * 1
        let value = RollingQuantile::of(&[5.0, 1.0, 4.0, 2.0, 3.0], 0.9).unwrap();
        assert!((value - 4.6).abs() < 1e-10);

        assert_eq!(RollingQuantile::of(&[3.0, 1.0, 2.0], 0.5), Some(2.0));
        assert_eq!(RollingQuantile::of(&[], 0.5), None);
    }

    #[test]
    fn test_rolling_quantile_windows() {
        let rq = RollingQuantile::new(3, 1.0);
        let result = rq.calculate(&[1.0, 5.0, 2.0, 0.0, 0.5]);

        assert_eq!(result, vec![5.0, 5.0, 2.0]);
    }
}
