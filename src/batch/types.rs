//! Settings and per-item outcomes for the batch service.

use crate::downstream::DownstreamError;
use std::time::Duration;

/// Tunables applied to every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Deadline for a single downstream call.
    pub timeout: Duration,
    /// Maximum number of downstream calls in flight. `1` processes items sequentially.
    pub concurrency: usize,
}

impl BatchSettings {
    /// Sequential processing with the given per-call deadline.
    pub const fn sequential(timeout: Duration) -> Self {
        Self {
            timeout,
            concurrency: 1,
        }
    }

    /// Override the number of concurrent downstream calls (clamped to at least one).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Result of one downstream call, consumed immediately by the batch loop.
pub(crate) enum DownstreamOutcome<T> {
    Success(T),
    Failure {
        cause: DownstreamError,
        elapsed: Duration,
    },
}

/// How an item reached its final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    Annotated,
    Fallback,
    Skipped,
}
