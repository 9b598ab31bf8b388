//! Evaluation engine - concurrent pipeline over a bounded worker pool
//!
//! This module contains the moving parts of the pipeline:
//!
//! - **EvaluationEngine**: orchestrates projects and features, sealing each
//!   feature's statistics and handing them to consumers
//! - **SliceChain**: the retrieve → compute → merge unit of work, one per
//!   (feature, time slice)
//! - **FailFastSet**: completes a feature's batch on all-success or first
//!   failure, cancelling the rest
//! - **WorkerPool**: bounded admission with a graceful-then-forced shutdown
//!   protocol

pub mod chain;
pub mod combinator;
pub mod orchestrator;
pub mod worker_pool;

// Re-exports for convenience
pub use chain::{ChainOutcome, SliceChain};
pub use combinator::{CancellationFlag, FailFastSet};
pub use orchestrator::{
    EngineConfig, EvaluationEngine, EvaluationEngineBuilder, EvaluationSummary, ExecutionResult,
    FeatureSummary, ProjectFailure, ProjectSummary,
};
pub use worker_pool::{ShutdownReport, WorkerPool, WorkerPoolConfig, MIN_WORKERS};
