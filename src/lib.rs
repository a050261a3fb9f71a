#![deny(missing_docs)]

//! Fault-isolated batch annotation services for a conversational pipeline.

/// HTTP routing and handlers.
pub mod api;
/// Batch orchestration with per-item deadlines and fallbacks.
pub mod batch;
/// Startup wiring from configuration to router.
pub mod bootstrap;
/// Environment-driven configuration management.
pub mod config;
/// Downstream annotator abstraction and implementations.
pub mod downstream;
/// Structured logging and tracing setup.
pub mod logging;
/// Batch metrics helpers.
pub mod metrics;
/// Failure reporting for downstream calls.
pub mod reporting;
