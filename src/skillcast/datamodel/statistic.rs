//! Computed statistics and their metadata
//!
//! A metric applied to one input produces a [`Statistic`]: a heterogeneous
//! union covering everything from a single score to a box plot. The store is
//! generic over its value type and never inspects the shape; the union here
//! is the concrete payload the engine moves around.

use crate::skillcast::config::declaration::StatisticCategory;
use crate::skillcast::datamodel::threshold::ThresholdPair;
use chrono::TimeDelta;
use std::fmt;

/// The shape of one computed statistic.
#[derive(Debug, Clone, PartialEq)]
pub enum Statistic {
    /// A single score value
    Score(f64),
    /// A vector of values, e.g. one entry per category
    Vector(Vec<f64>),
    /// Several named-by-position vectors, e.g. a reliability diagram
    MultiVector(Vec<Vec<f64>>),
    /// A row-major matrix, e.g. a contingency table
    Matrix(Vec<Vec<f64>>),
    /// A series of (lead duration, value) pairs
    Paired(Vec<(TimeDelta, f64)>),
    /// A box plot: probabilities and the quantiles at those probabilities
    BoxPlot {
        probabilities: Vec<f64>,
        quantiles: Vec<f64>,
    },
}

impl Statistic {
    /// The declared category this shape belongs to
    pub fn category(&self) -> StatisticCategory {
        match self {
            Statistic::Score(_) => StatisticCategory::Score,
            Statistic::Vector(_) => StatisticCategory::Vector,
            Statistic::MultiVector(_) => StatisticCategory::MultiVector,
            Statistic::Matrix(_) => StatisticCategory::Matrix,
            Statistic::Paired(_) => StatisticCategory::Paired,
            Statistic::BoxPlot { .. } => StatisticCategory::BoxPlot,
        }
    }

    /// The score value, when this statistic is a score
    pub fn as_score(&self) -> Option<f64> {
        match self {
            Statistic::Score(value) => Some(*value),
            _ => None,
        }
    }
}

/// Metadata carried by every statistic: enough to reconstruct its context
/// without consulting the store key.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticMetadata {
    metric: String,
    sample_size: usize,
    unit: String,
}

impl StatisticMetadata {
    pub fn new(metric: impl Into<String>, sample_size: usize, unit: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            sample_size,
            unit: unit.into(),
        }
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

/// One computed statistic with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricOutput {
    statistic: Statistic,
    metadata: StatisticMetadata,
}

impl MetricOutput {
    pub fn of(statistic: Statistic, metadata: StatisticMetadata) -> Self {
        Self {
            statistic,
            metadata,
        }
    }

    pub fn data(&self) -> &Statistic {
        &self.statistic
    }

    pub fn metadata(&self) -> &StatisticMetadata {
        &self.metadata
    }
}

impl fmt::Display for MetricOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} samples, {})",
            self.metadata.metric(),
            self.metadata.sample_size(),
            self.metadata.unit()
        )
    }
}

/// A statistic as produced by the metric processor for one input: the metric
/// name and threshold pair that key it, plus the output itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStatistic {
    metric: String,
    thresholds: ThresholdPair,
    output: MetricOutput,
}

impl ComputedStatistic {
    pub fn new(metric: impl Into<String>, thresholds: ThresholdPair, output: MetricOutput) -> Self {
        Self {
            metric: metric.into(),
            thresholds,
            output,
        }
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn thresholds(&self) -> &ThresholdPair {
        &self.thresholds
    }

    pub fn output(&self) -> &MetricOutput {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(
            Statistic::Score(0.5).category(),
            StatisticCategory::Score
        );
        assert_eq!(
            Statistic::BoxPlot {
                probabilities: vec![0.25, 0.5, 0.75],
                quantiles: vec![1.0, 2.0, 3.0],
            }
            .category(),
            StatisticCategory::BoxPlot
        );
    }

    #[test]
    fn test_as_score() {
        assert_eq!(Statistic::Score(0.026543876961751534).as_score(), Some(0.026543876961751534));
        assert_eq!(Statistic::Vector(vec![1.0]).as_score(), None);
    }
}
