//! Retrieval and ingestion collaborator interfaces
//!
//! The engine never reads source data itself. An implementation of
//! [`PoolRetriever`] hands it, per (project, feature), a finite list of
//! pending operations, one per lead time or other pooling dimension; each
//! pending operation is lazy and does no work until a worker awaits its
//! [`PendingPool::fetch`]. [`TimeSeriesIngester`] is invoked once per
//! project before any of its features are processed.
//!
//! Retry policy belongs to the implementations; the engine treats any error
//! from these traits as fatal to the chain or project that observed it.

use crate::skillcast::config::declaration::{Feature, ProjectDeclaration};
use crate::skillcast::datamodel::input::MetricInput;
use crate::skillcast::datamodel::time_slice::TimeSlice;
use crate::skillcast::error::EvaluationResult;
use async_trait::async_trait;

/// One pending retrieval: will eventually yield the paired data for one
/// time slice, or fail.
#[async_trait]
pub trait PendingPool: Send + Sync {
    /// The time slice this pool covers
    fn time_slice(&self) -> TimeSlice;

    /// Block until the paired data for this slice is available.
    ///
    /// This is the only long-blocking stage of a chain; no implicit timeout
    /// is imposed here, so an implementation wanting bounded latency must
    /// supply its own.
    async fn fetch(&self) -> EvaluationResult<MetricInput>;
}

/// Supplies the pending retrievals for one (project, feature).
#[async_trait]
pub trait PoolRetriever: Send + Sync {
    /// The finite sequence of pending operations for this feature, one per
    /// pooling dimension value (typically forecast lead time)
    async fn pools(
        &self,
        project: &ProjectDeclaration,
        feature: &Feature,
    ) -> EvaluationResult<Vec<Box<dyn PendingPool>>>;
}

/// Ingests the source time-series a project requires into whatever backing
/// store the retriever reads from.
#[async_trait]
pub trait TimeSeriesIngester: Send + Sync {
    /// Invoked once per project, before any feature is processed
    async fn ingest(&self, project: &ProjectDeclaration) -> EvaluationResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_collaborators_are_object_safe_and_shareable() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<Arc<dyn PoolRetriever>>();
        assert_send_sync::<Arc<dyn TimeSeriesIngester>>();
        assert_send_sync::<Box<dyn PendingPool>>();
    }
}
