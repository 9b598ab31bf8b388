//! Paired input data ready for metric computation

use crate::skillcast::config::declaration::Feature;
use crate::skillcast::datamodel::time_slice::TimeSlice;

/// The paired dataset for one (feature, time slice), plus the metadata the
/// compute stage needs to key its outputs.
///
/// Produced by the retrieval collaborator and consumed exactly once by the
/// metric processor. Pairs are (observed, predicted).
#[derive(Debug, Clone, PartialEq)]
pub struct MetricInput {
    feature: Feature,
    time_slice: TimeSlice,
    pairs: Vec<(f64, f64)>,
    unit: String,
}

impl MetricInput {
    pub fn new(
        feature: Feature,
        time_slice: TimeSlice,
        pairs: Vec<(f64, f64)>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            feature,
            time_slice,
            pairs,
            unit: unit.into(),
        }
    }

    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    pub fn time_slice(&self) -> &TimeSlice {
        &self.time_slice
    }

    pub fn pairs(&self) -> &[(f64, f64)] {
        &self.pairs
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
