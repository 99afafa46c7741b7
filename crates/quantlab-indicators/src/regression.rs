//! Least-squares linear regression against the bar index.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Result of fitting `y = intercept + slope * x` with `x = 0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; 0 when `y` is constant
    pub r_squared: f64,
}

/// Fit a straight line through `y` sampled at consecutive integer positions.
///
/// Returns `None` for fewer than two points.
pub fn linear_regression(y: &[f64]) -> Option<LinearFit> {
    if y.len() < 2 {
        return None;
    }

    let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();

    let mean_x = x.iter().mean();
    let mean_y = y.iter().mean();
    let var_x = x.iter().population_variance();
    let var_y = y.iter().population_variance();
    let cov_xy = x.iter().population_covariance(y.iter());

    let slope = cov_xy / var_x;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if var_y > 0.0 {
        (cov_xy * cov_xy / (var_x * var_y)).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}
