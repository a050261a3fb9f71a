//! Downstream annotators: the per-item capabilities the batch service orchestrates.

pub mod assistance;
pub mod badlist;
pub mod cobot;
pub mod dialogrpt;
pub mod types;

pub use assistance::AssistanceDetector;
pub use badlist::{BadlistDetector, LexiconError};
pub use cobot::CobotNerClient;
pub use dialogrpt::DialogRptScorer;
pub use types::{
    AssistanceFlags, DownstreamError, EntityAnnotation, LabelledEntity, RankingItem,
};

use async_trait::async_trait;

/// Capability that turns one item into a structured annotation, or fails.
///
/// Annotators perform a single attempt per call and never retry. Deadlines are enforced by
/// the caller, so implementations should not impose their own.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// One unit of input.
    type Item: Send + Sync;
    /// Annotation produced for one item.
    type Output: Send;

    /// Stable service name used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// Annotate a single item.
    async fn annotate(&self, item: &Self::Item) -> Result<Self::Output, DownstreamError>;

    /// Shape-preserving substitute returned when `annotate` fails for `item`.
    fn fallback(&self, item: &Self::Item) -> Self::Output;

    /// Finalize `item` without a downstream call, when its result is already determined.
    fn skip(&self, _item: &Self::Item) -> Option<Self::Output> {
        None
    }
}
