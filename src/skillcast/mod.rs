pub mod config;
pub mod consumer;
pub mod datamodel;
pub mod engine;
pub mod error;
pub mod processor;
pub mod retrieval;

// Re-export the main API surface
pub use config::{Declaration, Feature, ProjectDeclaration, StatisticCategory};
pub use datamodel::{
    ComputedStatistic, FeatureStatistics, MetricInput, MetricOutput, ResultKey, Statistic,
    StatisticMetadata, StatisticStore, StatisticsAccumulator, Threshold, ThresholdPair, TimeSlice,
};
pub use engine::{
    EngineConfig, EvaluationEngine, EvaluationEngineBuilder, ExecutionResult, FailFastSet,
    WorkerPool, WorkerPoolConfig,
};
pub use error::{EvaluationError, EvaluationResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
