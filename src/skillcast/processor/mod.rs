//! Metric-processor collaborator interface
//!
//! The metric formulas themselves live outside the engine. A
//! [`MetricProcessorFactory`] checks, before any chain is scheduled, that
//! the declared metrics and output categories can actually be produced; the
//! configured [`MetricProcessor`] is then a pure function from one input to
//! its computed statistics, shared by every chain of the feature.

use crate::skillcast::config::declaration::{ProjectDeclaration, StatisticCategory};
use crate::skillcast::datamodel::input::MetricInput;
use crate::skillcast::datamodel::statistic::ComputedStatistic;
use crate::skillcast::error::EvaluationResult;
use std::sync::Arc;

/// A configured metric processor: pure and CPU-bound.
///
/// `apply` must not block on I/O; it runs on the shared worker pool between
/// the retrieve and merge stages of a chain.
pub trait MetricProcessor: Send + Sync {
    /// Compute all configured metrics over one input, partitioned by metric
    /// name and threshold pair
    fn apply(&self, input: &MetricInput) -> EvaluationResult<Vec<ComputedStatistic>>;
}

/// Builds a processor for the metrics and output categories a project
/// declares.
pub trait MetricProcessorFactory: Send + Sync {
    /// Configure a processor, or fail with a configuration error when the
    /// declared combination cannot be satisfied.
    ///
    /// Configuration errors are detected here, before scheduling, so a
    /// rejected feature schedules zero chains.
    fn configure(
        &self,
        project: &ProjectDeclaration,
        categories: &[StatisticCategory],
    ) -> EvaluationResult<Arc<dyn MetricProcessor>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processor_is_shareable_across_chains() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<Arc<dyn MetricProcessor>>();
        assert_send_sync::<Arc<dyn MetricProcessorFactory>>();
    }
}
