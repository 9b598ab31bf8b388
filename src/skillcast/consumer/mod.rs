//! Statistics consumer interfaces
//!
//! Downstream reporting and charting attach here. A [`StatisticsConsumer`]
//! receives each feature's sealed statistics once, at the end of the
//! feature's batch. An [`IncrementalConsumer`], when registered, is also
//! handed a snapshot from each chain as it merges, for output categories
//! that are too numerous to buffer until end-of-run.

use crate::skillcast::config::declaration::Feature;
use crate::skillcast::datamodel::statistic::ComputedStatistic;
use crate::skillcast::datamodel::store::FeatureStatistics;
use crate::skillcast::datamodel::time_slice::TimeSlice;
use crate::skillcast::error::EvaluationResult;
use async_trait::async_trait;

/// The statistics one chain merged for one time slice, forwarded as the
/// chain completes.
#[derive(Debug, Clone)]
pub struct StatisticsSnapshot {
    feature: Feature,
    time_slice: TimeSlice,
    statistics: Vec<ComputedStatistic>,
}

impl StatisticsSnapshot {
    pub fn new(
        feature: Feature,
        time_slice: TimeSlice,
        statistics: Vec<ComputedStatistic>,
    ) -> Self {
        Self {
            feature,
            time_slice,
            statistics,
        }
    }

    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    pub fn time_slice(&self) -> &TimeSlice {
        &self.time_slice
    }

    pub fn statistics(&self) -> &[ComputedStatistic] {
        &self.statistics
    }
}

/// Receives a feature's sealed statistics at end-of-batch.
#[async_trait]
pub trait StatisticsConsumer: Send + Sync {
    async fn accept(
        &self,
        feature: &Feature,
        statistics: &FeatureStatistics,
    ) -> EvaluationResult<()>;
}

/// Receives per-chain snapshots as they merge, ahead of end-of-batch.
#[async_trait]
pub trait IncrementalConsumer: Send + Sync {
    async fn accept(&self, snapshot: StatisticsSnapshot) -> EvaluationResult<()>;
}
