use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Thread-safe counters describing batch annotation activity.
#[derive(Default)]
pub struct BatchMetrics {
    batches: AtomicU64,
    items: AtomicU64,
    failures: AtomicU64,
    skipped: AtomicU64,
    last_batch_ms: AtomicU64,
}

impl BatchMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed batch.
    ///
    /// `failures` counts items that fell back; `skipped` counts items finalized without a
    /// downstream call.
    pub fn record_batch(&self, items: u64, failures: u64, skipped: u64, elapsed: Duration) {
        self.items.fetch_add(items, Ordering::Relaxed);
        self.failures.fetch_add(failures, Ordering::Relaxed);
        self.skipped.fetch_add(skipped, Ordering::Relaxed);
        self.last_batch_ms
            .store(elapsed.as_millis() as u64, Ordering::Relaxed);
        self.batches.fetch_add(1, Ordering::Release);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let batches = self.batches.load(Ordering::Acquire);
        MetricsSnapshot {
            batches,
            items: self.items.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            last_batch_ms: (batches > 0).then(|| self.last_batch_ms.load(Ordering::Relaxed)),
        }
    }
}

/// Immutable view of batch counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of batches processed since startup.
    pub batches: u64,
    /// Total items processed across all batches.
    pub items: u64,
    /// Items whose downstream call failed and received a fallback value.
    pub failures: u64,
    /// Items finalized without a downstream call.
    pub skipped: u64,
    /// Wall-clock duration of the most recent batch.
    pub last_batch_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_batches_and_items() {
        let metrics = BatchMetrics::new();
        metrics.record_batch(3, 1, 0, Duration::from_millis(40));
        metrics.record_batch(2, 0, 1, Duration::from_millis(7));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches, 2);
        assert_eq!(snapshot.items, 5);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.last_batch_ms, Some(7));
    }

    #[test]
    fn empty_snapshot_has_no_last_batch() {
        let metrics = BatchMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches, 0);
        assert_eq!(snapshot.last_batch_ms, None);
    }
}
