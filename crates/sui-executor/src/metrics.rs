//! Hit/miss counters for the object cache.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cache operation metrics (thread-safe counters).
///
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    /// Unresolved objects filled in from the cache
    pub object_hits: Arc<AtomicU64>,
    /// Unresolved objects left for the ledger to resolve
    pub object_misses: Arc<AtomicU64>,
    /// Move calls whose signature came from the cache
    pub function_hits: Arc<AtomicU64>,
    pub function_misses: Arc<AtomicU64>,
    /// Objects dropped after effects or a failed execution
    pub invalidations: Arc<AtomicU64>,
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self {
            object_hits: Arc::new(AtomicU64::new(0)),
            object_misses: Arc::new(AtomicU64::new(0)),
            function_hits: Arc::new(AtomicU64::new(0)),
            function_misses: Arc::new(AtomicU64::new(0)),
            invalidations: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl CacheMetrics {
    pub fn record_object_hit(&self) {
        self.object_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_object_miss(&self) {
        self.object_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_function_hit(&self) {
        self.function_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_function_miss(&self) {
        self.function_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidations(&self, count: u64) {
        self.invalidations.fetch_add(count, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            object_hits: self.object_hits.load(Ordering::Relaxed),
            object_misses: self.object_misses.load(Ordering::Relaxed),
            function_hits: self.function_hits.load(Ordering::Relaxed),
            function_misses: self.function_misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.object_hits.store(0, Ordering::Relaxed);
        self.object_misses.store(0, Ordering::Relaxed);
        self.function_hits.store(0, Ordering::Relaxed);
        self.function_misses.store(0, Ordering::Relaxed);
        self.invalidations.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of metrics (for reporting).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub object_hits: u64,
    pub object_misses: u64,
    pub function_hits: u64,
    pub function_misses: u64,
    pub invalidations: u64,
}

impl MetricsSnapshot {
    /// Fraction of object lookups served from the cache, in `[0, 1]`.
    pub fn object_hit_rate(&self) -> f64 {
        let total = self.object_hits + self.object_misses;
        if total == 0 {
            0.0
        } else {
            self.object_hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counters() {
        let metrics = CacheMetrics::default();
        let clone = metrics.clone();
        clone.record_object_hit();
        clone.record_object_hit();
        metrics.record_object_miss();
        metrics.record_invalidations(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.object_hits, 2);
        assert_eq!(snapshot.object_misses, 1);
        assert_eq!(snapshot.invalidations, 3);
        assert!((snapshot.object_hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);

        metrics.reset();
        assert_eq!(clone.snapshot(), MetricsSnapshot::default());
    }
}
