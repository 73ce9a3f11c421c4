use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    rows_encoded: AtomicU64,
    rows_committed: AtomicU64,
    batches_committed: AtomicU64,
    bytes_copied: AtomicU64,
    failure_count: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub rows_encoded: u64,
    pub rows_committed: u64,
    pub batches_committed: u64,
    pub bytes_copied: u64,
    pub failure_count: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_encoded(&self, count: u64) {
        self.inner.rows_encoded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_batch(&self, rows: u64, bytes: u64) {
        self.inner.rows_committed.fetch_add(rows, Ordering::Relaxed);
        self.inner.bytes_copied.fetch_add(bytes, Ordering::Relaxed);
        self.inner.batches_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failures(&self, count: u64) {
        self.inner.failure_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rows_encoded: self.inner.rows_encoded.load(Ordering::Relaxed),
            rows_committed: self.inner.rows_committed.load(Ordering::Relaxed),
            batches_committed: self.inner.batches_committed.load(Ordering::Relaxed),
            bytes_copied: self.inner.bytes_copied.load(Ordering::Relaxed),
            failure_count: self.inner.failure_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
