//! In-memory bar series cache.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use quantlab_core::types::{BarSeries, Interval};
use tracing::debug;

type CacheKey = (String, Interval);

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Bounded cache of bar series keyed by symbol and interval.
///
/// Inserting past capacity evicts the oldest insertion.
pub struct BarCache {
    entries: HashMap<CacheKey, Arc<BarSeries>>,
    order: VecDeque<CacheKey>,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl BarCache {
    /// Create a new cache holding at most `max_entries` series.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    fn key(symbol: &str, interval: Interval) -> CacheKey {
        (symbol.to_uppercase(), interval)
    }

    /// Get a cached series.
    pub fn get(&mut self, symbol: &str, interval: Interval) -> Option<Arc<BarSeries>> {
        let found = self.entries.get(&Self::key(symbol, interval)).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// Store a series, replacing any entry for the same key.
    pub fn insert(&mut self, series: BarSeries) -> Arc<BarSeries> {
        let key = Self::key(&series.symbol, series.interval);
        let series = Arc::new(series);

        if self.entries.insert(key.clone(), series.clone()).is_none() {
            self.order.push_back(key);
        }

        while self.entries.len() > self.max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            debug!(symbol = %oldest.0, interval = %oldest.1, "Evicted cached series");
        }

        series
    }

    /// Return the cached series or load, cache and return it.
    pub fn get_or_try_load<E>(
        &mut self,
        symbol: &str,
        interval: Interval,
        load: impl FnOnce() -> Result<BarSeries, E>,
    ) -> Result<Arc<BarSeries>, E> {
        if let Some(series) = self.get(symbol, interval) {
            return Ok(series);
        }
        let series = load()?;
        Ok(self.insert(series))
    }

    /// Drop every entry for a symbol. Returns the number removed.
    pub fn invalidate(&mut self, symbol: &str) -> usize {
        let symbol = symbol.to_uppercase();
        let before = self.entries.len();
        self.entries.retain(|(s, _), _| *s != symbol);
        self.order.retain(|(s, _)| *s != symbol);
        before - self.entries.len()
    }

    /// Clear all cached data.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

impl Default for BarCache {
    fn default() -> Self {
        Self::new(16)
    }
}
