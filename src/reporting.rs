//! Failure reporting for downstream calls.
//!
//! The batch service never surfaces per-item failures to its caller. Instead every failure is
//! handed to a [`FailureReporter`], which forwards it to whatever observability backend the
//! process uses. The default reporter emits structured `tracing` events.

use std::sync::Mutex;
use std::time::Duration;

/// One failed downstream call, captured for observability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEvent {
    /// Service variant that issued the call.
    pub service: &'static str,
    /// Position of the item inside its batch.
    pub index: usize,
    /// Stable failure tag (`timeout`, `bad_status`, `malformed`, `transport`).
    pub kind: &'static str,
    /// HTTP status returned by the downstream, when one was received.
    pub status: Option<u16>,
    /// Response body returned alongside a bad status.
    pub body: Option<String>,
    /// Human-readable failure description.
    pub message: String,
    /// Time spent on the call before it was abandoned.
    pub elapsed: Duration,
}

/// Sink for downstream failure events.
pub trait FailureReporter: Send + Sync {
    /// Report a single failure. Implementations must not panic or block for long.
    fn report(&self, event: &FailureEvent);
}

/// Reporter that emits one structured log line per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, event: &FailureEvent) {
        let elapsed_ms = event.elapsed.as_millis() as u64;
        match event.status {
            Some(status) => tracing::warn!(
                service = event.service,
                index = event.index,
                kind = event.kind,
                status,
                body = event.body.as_deref().unwrap_or_default(),
                elapsed_ms,
                "result status code is not 200: {}",
                event.message
            ),
            None => tracing::error!(
                service = event.service,
                index = event.index,
                kind = event.kind,
                elapsed_ms,
                error = %event.message,
                "Downstream call failed"
            ),
        }
    }
}

/// Reporter that keeps every event in memory, for inspection by embedding code and tests.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<FailureEvent>>,
}

impl MemoryReporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the events recorded so far.
    pub fn events(&self) -> Vec<FailureEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl FailureReporter for MemoryReporter {
    fn report(&self, event: &FailureEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
