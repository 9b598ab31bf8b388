//! # skillcast
//!
//! A concurrent forecast-skill evaluation engine. Pairs time-indexed
//! forecast and observation data, computes statistical metrics over many
//! independent slices (one per geographic feature × forecast lead time ×
//! threshold) and collects the results into a queryable store for
//! downstream reporting.
//!
//! ## Features
//!
//! - **Concurrent Pipeline**: one retrieve → compute → merge chain per
//!   slice, fanned onto a bounded, work-stealing worker pool
//! - **Fail-Fast Batches**: a feature's chains complete together or stop at
//!   the first failure, with cooperative cancellation of the rest
//! - **Queryable Statistics Store**: immutable per-metric stores keyed by
//!   (time slice, threshold pair) with pure filter and slice operations
//! - **Pluggable Collaborators**: retrieval, ingestion, metric processing
//!   and reporting attach through trait interfaces
//! - **Two-Phase Shutdown**: graceful drain with progress logging, then a
//!   bounded forced stop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skillcast::skillcast::config::{Declaration, ProjectDeclaration};
//! use skillcast::skillcast::engine::{EngineConfig, EvaluationEngine};
//! # use std::sync::Arc;
//! # use skillcast::skillcast::retrieval::{PoolRetriever, TimeSeriesIngester};
//! # use skillcast::skillcast::processor::MetricProcessorFactory;
//!
//! # async fn example(
//! #     retriever: Arc<dyn PoolRetriever>,
//! #     ingester: Arc<dyn TimeSeriesIngester>,
//! #     processors: Arc<dyn MetricProcessorFactory>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = EvaluationEngine::builder()
//!     .retriever(retriever)
//!     .ingester(ingester)
//!     .processor_factory(processors)
//!     .config(EngineConfig::with_workers(8))
//!     .build()?;
//!
//! let declaration = Declaration::new().with_project(
//!     ProjectDeclaration::new("baseline")
//!         .with_feature("DRRC2")
//!         .with_metric("mean_error"),
//! );
//!
//! let result = engine.evaluate(&declaration).await;
//! println!("{}", result);
//! engine.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod skillcast;

// Re-export the primary API at the crate root
pub use skillcast::config::{Declaration, Feature, ProjectDeclaration, StatisticCategory};
pub use skillcast::datamodel::{
    FeatureStatistics, MetricInput, MetricOutput, ResultKey, Statistic, StatisticStore, Threshold,
    ThresholdPair, TimeSlice,
};
pub use skillcast::engine::{EvaluationEngine, ExecutionResult};
pub use skillcast::error::{EvaluationError, EvaluationResult};
