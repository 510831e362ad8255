//! Cache Statistics Module
//!
//! The metrics collaborator the cache layer reports to, and the default
//! in-process implementation backing `GET /cache/stats`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

// == Metrics Collaborator ==
/// Receives cache observations. Implementations must not block.
pub trait CacheMetrics: Send + Sync {
    fn record_hit(&self, key: &str);
    fn record_miss(&self, key: &str);
    fn record_slow_operation(&self, operation: &str, elapsed: Duration);
}

// == Cache Stats ==
/// Lock-free hit, miss and slow-operation counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    slow_operations: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub slow_operations: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        CacheStatsSnapshot {
            hits,
            misses,
            slow_operations: self.slow_operations.load(Ordering::Relaxed),
            hit_rate: hit_rate(hits, misses),
        }
    }
}

// == Hit Rate ==
/// Returns hits / (hits + misses), or 0.0 if no requests have been made.
fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

impl CacheMetrics for CacheStats {
    fn record_hit(&self, _key: &str) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self, _key: &str) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_slow_operation(&self, operation: &str, elapsed: Duration) {
        self.slow_operations.fetch_add(1, Ordering::Relaxed);
        warn!(operation, elapsed_ms = elapsed.as_millis() as u64, "Slow cache operation");
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.snapshot(), CacheStatsSnapshot::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().snapshot().hit_rate, 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats::new();
        stats.record_hit("a");
        stats.record_hit("a");
        stats.record_hit("a");
        stats.record_miss("b");

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hits, 3);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.hit_rate, 0.75);
    }

    #[test]
    fn test_record_slow_operation() {
        let stats = CacheStats::new();
        stats.record_slow_operation("get", Duration::from_millis(120));
        assert_eq!(stats.snapshot().slow_operations, 1);
    }
}
