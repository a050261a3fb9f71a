//! Batch service coordinating per-item downstream calls.

use crate::{
    batch::types::{BatchSettings, DownstreamOutcome, Resolution},
    downstream::{Annotator, DownstreamError},
    metrics::{BatchMetrics, MetricsSnapshot},
    reporting::{FailureEvent, FailureReporter, TracingReporter},
};
use futures_util::{StreamExt, stream};
use std::sync::Arc;
use std::time::Instant;

/// Runs an [`Annotator`] over every item of a batch without letting one item's failure
/// affect another.
///
/// Each item gets a single attempt bounded by [`BatchSettings::timeout`]. Failed items are
/// reported and replaced by the annotator's fallback, so the returned vector always has the
/// same length and order as the input. Construct once at startup and share through an `Arc`.
pub struct BatchService<A> {
    annotator: Arc<A>,
    settings: BatchSettings,
    reporter: Arc<dyn FailureReporter>,
    metrics: Arc<BatchMetrics>,
}

impl<A: Annotator> BatchService<A> {
    /// Build a service that reports failures through `tracing`.
    pub fn new(annotator: A, settings: BatchSettings) -> Self {
        Self {
            annotator: Arc::new(annotator),
            settings,
            reporter: Arc::new(TracingReporter),
            metrics: Arc::new(BatchMetrics::new()),
        }
    }

    /// Replace the failure reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Name of the wrapped annotator.
    pub fn name(&self) -> &'static str {
        self.annotator.name()
    }

    /// Settings applied to every batch.
    pub fn settings(&self) -> BatchSettings {
        self.settings
    }

    /// Return the current batch metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Annotate every item, returning one result per item in input order.
    ///
    /// Never fails: items whose downstream call errors or times out receive the annotator's
    /// fallback value.
    pub async fn process_batch(&self, items: Vec<A::Item>) -> Vec<A::Output> {
        let started = Instant::now();
        let total = items.len();

        let finalized: Vec<(A::Output, Resolution)> = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| self.process_item(index, item))
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let failures = count(&finalized, Resolution::Fallback);
        let skipped = count(&finalized, Resolution::Skipped);
        let elapsed = started.elapsed();
        self.metrics
            .record_batch(total as u64, failures, skipped, elapsed);
        tracing::info!(
            service = self.name(),
            items = total,
            failures,
            skipped,
            elapsed_ms = elapsed.as_millis() as u64,
            "{} exec time: {:.3}s",
            self.name(),
            elapsed.as_secs_f64()
        );

        finalized.into_iter().map(|(output, _)| output).collect()
    }

    async fn process_item(&self, index: usize, item: A::Item) -> (A::Output, Resolution) {
        if let Some(output) = self.annotator.skip(&item) {
            return (output, Resolution::Skipped);
        }

        match self.call_downstream(&item).await {
            DownstreamOutcome::Success(output) => (output, Resolution::Annotated),
            DownstreamOutcome::Failure { cause, elapsed } => {
                self.reporter.report(&FailureEvent {
                    service: self.name(),
                    index,
                    kind: cause.kind(),
                    status: cause.status(),
                    body: cause.body().map(str::to_string),
                    message: cause.to_string(),
                    elapsed,
                });
                (self.annotator.fallback(&item), Resolution::Fallback)
            }
        }
    }

    async fn call_downstream(&self, item: &A::Item) -> DownstreamOutcome<A::Output> {
        let started = Instant::now();
        let limit = self.settings.timeout;
        match tokio::time::timeout(limit, self.annotator.annotate(item)).await {
            Ok(Ok(output)) => DownstreamOutcome::Success(output),
            Ok(Err(cause)) => DownstreamOutcome::Failure {
                cause,
                elapsed: started.elapsed(),
            },
            Err(_) => DownstreamOutcome::Failure {
                cause: DownstreamError::Timeout { limit },
                elapsed: started.elapsed(),
            },
        }
    }
}

fn count<T>(finalized: &[(T, Resolution)], resolution: Resolution) -> u64 {
    finalized
        .iter()
        .filter(|(_, current)| *current == resolution)
        .count() as u64
}
