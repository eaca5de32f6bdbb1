//! Counters for invalidation batching.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics for the invalidation batcher.
#[derive(Debug, Default)]
pub struct InvalidationMetrics {
    /// Paths appended to a pending batch.
    pub paths_queued: AtomicU64,
    /// Keys ignored because their bucket has no distribution.
    pub paths_skipped: AtomicU64,
    /// Pending batches started.
    pub batches_created: AtomicU64,
    /// Purge calls accepted by the control plane.
    pub batches_flushed: AtomicU64,
    /// Paths sent in accepted purge calls.
    pub paths_flushed: AtomicU64,
    /// Purge calls that failed.
    pub flush_failures: AtomicU64,
}

impl InvalidationMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_queued(&self, created_batch: bool) {
        self.paths_queued.fetch_add(1, Ordering::Relaxed);
        if created_batch {
            self.batches_created.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_skipped(&self) {
        self.paths_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flushed(&self, paths: u64) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
        self.paths_flushed.fetch_add(paths, Ordering::Relaxed);
    }

    pub fn record_flush_failure(&self) {
        self.flush_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            paths_queued: self.paths_queued.load(Ordering::Relaxed),
            paths_skipped: self.paths_skipped.load(Ordering::Relaxed),
            batches_created: self.batches_created.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            paths_flushed: self.paths_flushed.load(Ordering::Relaxed),
            flush_failures: self.flush_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub paths_queued: u64,
    pub paths_skipped: u64,
    pub batches_created: u64,
    pub batches_flushed: u64,
    pub paths_flushed: u64,
    pub flush_failures: u64,
}

/// Timer for measuring operation latency.
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
