// Data model for the evaluation pipeline
// Value types for slicing, the statistic union and the statistics store

pub mod input;
pub mod statistic;
pub mod store;
pub mod threshold;
pub mod time_slice;

// Re-export main API
pub use input::MetricInput;
pub use statistic::{ComputedStatistic, MetricOutput, Statistic, StatisticMetadata};
pub use store::{FeatureStatistics, ResultKey, StatisticStore, StatisticsAccumulator};
pub use threshold::{OneOrTwoValues, Threshold, ThresholdOperator, ThresholdPair, ThresholdSide};
pub use time_slice::TimeSlice;
