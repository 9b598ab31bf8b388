/*!
# Unit-of-Work Chain

One chain per (feature, time slice): retrieve the paired data, compute the
metrics, merge the statistics into the feature's accumulator and optionally
forward a snapshot to an incremental consumer.

Stages are strictly sequential within a chain; chains for different slices
run independently. The chain checks the batch's cancellation flag before
every stage, so after a sibling fails no further stage starts and, in
particular, nothing is ever written to the accumulator after cancellation
was observed.
*/

use crate::skillcast::config::declaration::Feature;
use crate::skillcast::consumer::{IncrementalConsumer, StatisticsSnapshot};
use crate::skillcast::datamodel::store::{ResultKey, StatisticsAccumulator};
use crate::skillcast::datamodel::time_slice::TimeSlice;
use crate::skillcast::engine::combinator::CancellationFlag;
use crate::skillcast::error::{EvaluationError, EvaluationResult};
use crate::skillcast::processor::MetricProcessor;
use crate::skillcast::retrieval::PendingPool;
use log::debug;
use std::sync::Arc;

/// What one completed chain reports back to the orchestrator.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    time_slice: TimeSlice,
    statistics_merged: usize,
}

impl ChainOutcome {
    pub fn time_slice(&self) -> &TimeSlice {
        &self.time_slice
    }

    pub fn statistics_merged(&self) -> usize {
        self.statistics_merged
    }
}

/// The retrieve → compute → merge task for one slice.
pub struct SliceChain {
    feature: Feature,
    pending: Box<dyn PendingPool>,
    processor: Arc<dyn MetricProcessor>,
    accumulator: Arc<StatisticsAccumulator>,
    incremental: Option<Arc<dyn IncrementalConsumer>>,
    cancel: CancellationFlag,
}

impl SliceChain {
    pub fn new(
        feature: Feature,
        pending: Box<dyn PendingPool>,
        processor: Arc<dyn MetricProcessor>,
        accumulator: Arc<StatisticsAccumulator>,
        incremental: Option<Arc<dyn IncrementalConsumer>>,
        cancel: CancellationFlag,
    ) -> Self {
        Self {
            feature,
            pending,
            processor,
            accumulator,
            incremental,
            cancel,
        }
    }

    /// Run the three stages to completion, or abort at the first failure or
    /// observed cancellation
    pub async fn run(self) -> EvaluationResult<ChainOutcome> {
        let slice = self.pending.time_slice();

        self.checkpoint("before retrieval")?;
        debug!(
            "Retrieving pairs for feature '{}', slice {}",
            self.feature, slice
        );
        let input = self.pending.fetch().await?;

        self.checkpoint("before computing")?;
        let computed = self.processor.apply(&input)?;

        self.checkpoint("before merging")?;
        for statistic in &computed {
            let key = ResultKey::new(
                input.time_slice().clone(),
                statistic.thresholds().clone(),
            );
            self.accumulator
                .insert(statistic.metric(), key, statistic.output().clone())?;
        }

        if let Some(consumer) = &self.incremental {
            let snapshot = StatisticsSnapshot::new(
                self.feature.clone(),
                input.time_slice().clone(),
                computed.clone(),
            );
            consumer.accept(snapshot).await?;
        }

        debug!(
            "Completed slice {} for feature '{}' with {} statistics",
            slice,
            self.feature,
            computed.len()
        );

        Ok(ChainOutcome {
            time_slice: slice,
            statistics_merged: computed.len(),
        })
    }

    fn checkpoint(&self, stage: &str) -> EvaluationResult<()> {
        if self.cancel.is_cancelled() {
            return Err(EvaluationError::interrupted(format!(
                "evaluation of feature '{}' cancelled {}",
                self.feature, stage
            )));
        }
        Ok(())
    }
}
