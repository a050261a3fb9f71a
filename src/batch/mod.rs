//! Batch annotation: per-item deadlines, fault isolation, and order-preserving assembly.

mod service;
pub mod types;

pub use service::BatchService;
pub use types::BatchSettings;
