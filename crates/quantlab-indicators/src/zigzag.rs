//! ZigZag swing pivots.

use serde::{Deserialize, Serialize};

/// Whether a pivot is a swing high or a swing low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotKind {
    High,
    Low,
}

/// A confirmed swing point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub index: usize,
    pub price: f64,
    pub kind: PivotKind,
}

/// ZigZag pivot detector.
///
/// A bar is a candidate swing high (low) when its high (low) is the extreme
/// of the `2 * pivot_legs + 1` bars centred on it. Candidates are reduced to
/// an alternating high/low sequence: a same-kind candidate replaces the last
/// pivot only if it is more extreme, and an opposite-kind candidate is kept
/// only if it moves at least `deviation` percent from the last pivot.
#[derive(Debug, Clone)]
pub struct ZigZag {
    deviation: f64,
    pivot_legs: usize,
}

impl ZigZag {
    /// Create a ZigZag with a percentage deviation and pivot leg count.
    pub fn new(deviation: f64, pivot_legs: usize) -> Self {
        assert!(deviation >= 0.0, "Deviation must not be negative");
        assert!(pivot_legs > 0, "Pivot legs must be greater than 0");
        Self {
            deviation,
            pivot_legs,
        }
    }

    /// Detect pivots in time order.
    pub fn pivots(&self, high: &[f64], low: &[f64]) -> Vec<Pivot> {
        let mut pivots: Vec<Pivot> = Vec::new();

        for candidate in self.candidates(high, low) {
            match pivots.last_mut() {
                None => pivots.push(candidate),
                Some(last) if last.kind == candidate.kind => {
                    let more_extreme = match candidate.kind {
                        PivotKind::High => candidate.price > last.price,
                        PivotKind::Low => candidate.price < last.price,
                    };
                    if more_extreme {
                        *last = candidate;
                    }
                }
                Some(last) => {
                    if self.moves_enough(last.price, candidate.price) {
                        pivots.push(candidate);
                    }
                }
            }
        }

        pivots
    }

    fn moves_enough(&self, from: f64, to: f64) -> bool {
        if from == 0.0 {
            return true;
        }
        ((to - from) / from).abs() * 100.0 >= self.deviation
    }

    fn candidates(&self, high: &[f64], low: &[f64]) -> Vec<Pivot> {
        let len = high.len().min(low.len());
        let legs = self.pivot_legs;
        let mut out = Vec::new();
        if len < 2 * legs + 1 {
            return out;
        }

        for i in legs..len - legs {
            let window = i - legs..=i + legs;
            let is_high = high[window.clone()].iter().all(|&h| h <= high[i]);
            let is_low = low[window].iter().all(|&l| l >= low[i]);

            if is_high {
                out.push(Pivot {
                    index: i,
                    price: high[i],
                    kind: PivotKind::High,
                });
            }
            if is_low {
                out.push(Pivot {
                    index: i,
                    price: low[i],
                    kind: PivotKind::Low,
                });
            }
        }

        out
    }
}
