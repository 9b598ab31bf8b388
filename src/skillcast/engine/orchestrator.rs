/*!
# Evaluation Orchestrator

Drives a whole declaration through the pipeline: per project, ingest the
required source data, then evaluate each feature by fanning one
[`SliceChain`](crate::skillcast::engine::chain::SliceChain) per pending
retrieval onto the shared worker pool and collecting them through one
fail-fast batch.

## Failure policy

Within a project the orchestrator is fail-fast: the first feature failure
aborts the project's remaining features and surfaces the causal error.
Across projects the run continues: each project's outcome is recorded
individually, and the overall result succeeds only when every project
passed. Partial statistics merged before a failure are never sealed or
handed to consumers.
*/

use crate::skillcast::config::declaration::{Declaration, Feature, ProjectDeclaration};
use crate::skillcast::consumer::{IncrementalConsumer, StatisticsConsumer};
use crate::skillcast::datamodel::store::StatisticsAccumulator;
use crate::skillcast::engine::chain::SliceChain;
use crate::skillcast::engine::combinator::FailFastSet;
use crate::skillcast::engine::worker_pool::{ShutdownReport, WorkerPool, WorkerPoolConfig};
use crate::skillcast::error::{EvaluationError, EvaluationResult};
use crate::skillcast::processor::MetricProcessorFactory;
use crate::skillcast::retrieval::{PoolRetriever, TimeSeriesIngester};
use log::{debug, error, info};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the evaluation engine
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub pool: WorkerPoolConfig,
}

impl EngineConfig {
    /// Create a fast configuration for testing
    pub fn for_tests() -> Self {
        Self {
            pool: WorkerPoolConfig::for_tests(),
        }
    }

    /// Create a configuration with specific pool parallelism
    pub fn with_workers(workers: usize) -> Self {
        Self {
            pool: WorkerPoolConfig::with_workers(workers),
        }
    }
}

/// Per-feature outcome recorded in the summary
#[derive(Debug, Clone, serde::Serialize)]
pub struct FeatureSummary {
    pub feature: Feature,
    pub slices_completed: usize,
    pub statistics_count: usize,
    pub metrics: Vec<String>,
}

/// Per-project outcome recorded in the summary
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub features: Vec<FeatureSummary>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Outcomes of the projects that completed
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct EvaluationSummary {
    pub projects: Vec<ProjectSummary>,
}

impl EvaluationSummary {
    /// Total statistics produced across all completed projects
    pub fn total_statistics(&self) -> usize {
        self.projects
            .iter()
            .flat_map(|project| project.features.iter())
            .map(|feature| feature.statistics_count)
            .sum()
    }
}

/// One failed project and its cause
#[derive(Debug, Clone)]
pub struct ProjectFailure {
    /// The failed project's name, when the failure is attributable to one
    pub project: Option<String>,
    /// The causal error; never absent on a failure
    pub cause: EvaluationError,
}

/// The result of one `evaluate` call: the summary of completed projects
/// plus any per-project failures.
#[derive(Debug)]
pub struct ExecutionResult {
    summary: EvaluationSummary,
    failures: Vec<ProjectFailure>,
}

impl ExecutionResult {
    fn from_parts(summary: EvaluationSummary, failures: Vec<ProjectFailure>) -> Self {
        Self { summary, failures }
    }

    /// True when every declared project completed
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> &EvaluationSummary {
        &self.summary
    }

    pub fn failures(&self) -> &[ProjectFailure] {
        &self.failures
    }

    /// The first failure observed, when any
    pub fn first_failure(&self) -> Option<&ProjectFailure> {
        self.failures.first()
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.succeeded() {
            write!(
                f,
                "Evaluation complete: {} projects, {} statistics",
                self.summary.projects.len(),
                self.summary.total_statistics()
            )
        } else {
            let first = &self.failures[0];
            match &first.project {
                Some(name) => write!(
                    f,
                    "Evaluation failed for project '{}': {}",
                    name, first.cause
                ),
                None => write!(f, "Evaluation failed: {}", first.cause),
            }
        }
    }
}

/// Builder for [`EvaluationEngine`].
///
/// The retrieval, ingestion and processor collaborators are required; the
/// consumers are optional.
#[derive(Default)]
pub struct EvaluationEngineBuilder {
    retriever: Option<Arc<dyn PoolRetriever>>,
    ingester: Option<Arc<dyn TimeSeriesIngester>>,
    processors: Option<Arc<dyn MetricProcessorFactory>>,
    consumers: Vec<Arc<dyn StatisticsConsumer>>,
    incremental: Option<Arc<dyn IncrementalConsumer>>,
    config: EngineConfig,
}

impl EvaluationEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retriever(mut self, retriever: Arc<dyn PoolRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn ingester(mut self, ingester: Arc<dyn TimeSeriesIngester>) -> Self {
        self.ingester = Some(ingester);
        self
    }

    pub fn processor_factory(mut self, processors: Arc<dyn MetricProcessorFactory>) -> Self {
        self.processors = Some(processors);
        self
    }

    /// Register a consumer of sealed per-feature statistics
    pub fn add_consumer(mut self, consumer: Arc<dyn StatisticsConsumer>) -> Self {
        self.consumers.push(consumer);
        self
    }

    /// Register a consumer of per-chain incremental snapshots
    pub fn incremental_consumer(mut self, consumer: Arc<dyn IncrementalConsumer>) -> Self {
        self.incremental = Some(consumer);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> EvaluationResult<EvaluationEngine> {
        let retriever = self.retriever.ok_or_else(|| {
            EvaluationError::configuration("evaluation engine requires a pool retriever")
        })?;
        let ingester = self.ingester.ok_or_else(|| {
            EvaluationError::configuration("evaluation engine requires a time-series ingester")
        })?;
        let processors = self.processors.ok_or_else(|| {
            EvaluationError::configuration("evaluation engine requires a metric processor factory")
        })?;

        Ok(EvaluationEngine {
            retriever,
            ingester,
            processors,
            consumers: self.consumers,
            incremental: self.incremental,
            pool: WorkerPool::new(self.config.pool)?,
        })
    }
}

/// The evaluation engine: schedules chains, collects their statistics and
/// hands sealed stores to consumers.
impl std::fmt::Debug for EvaluationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationEngine").finish_non_exhaustive()
    }
}

pub struct EvaluationEngine {
    retriever: Arc<dyn PoolRetriever>,
    ingester: Arc<dyn TimeSeriesIngester>,
    processors: Arc<dyn MetricProcessorFactory>,
    consumers: Vec<Arc<dyn StatisticsConsumer>>,
    incremental: Option<Arc<dyn IncrementalConsumer>>,
    pool: WorkerPool,
}

impl EvaluationEngine {
    pub fn builder() -> EvaluationEngineBuilder {
        EvaluationEngineBuilder::new()
    }

    /// Evaluate a declaration.
    ///
    /// Projects run in declaration order. A project failure stops that
    /// project's remaining features but the run proceeds to the remaining
    /// projects; every failure is recorded with its cause.
    pub async fn evaluate(&self, declaration: &Declaration) -> ExecutionResult {
        if let Err(cause) = declaration.validate() {
            return ExecutionResult::from_parts(
                EvaluationSummary::default(),
                vec![ProjectFailure {
                    project: None,
                    cause,
                }],
            );
        }

        let mut summary = EvaluationSummary::default();
        let mut failures = Vec::new();

        for project in declaration.projects() {
            info!(
                "Evaluating project '{}' with {} features",
                project.name(),
                project.features().len()
            );

            match self.evaluate_project(project).await {
                Ok(project_summary) => summary.projects.push(project_summary),
                Err(cause) => {
                    error!("Project '{}' failed: {}", project.name(), cause);
                    failures.push(ProjectFailure {
                        project: Some(project.name().to_string()),
                        cause,
                    });
                }
            }
        }

        ExecutionResult::from_parts(summary, failures)
    }

    async fn evaluate_project(
        &self,
        project: &ProjectDeclaration,
    ) -> EvaluationResult<ProjectSummary> {
        self.ingester.ingest(project).await?;

        let mut features = Vec::with_capacity(project.features().len());
        for feature in project.features() {
            // Fail-fast within a project: the first feature failure aborts
            // the remaining features
            features.push(self.evaluate_feature(project, feature).await?);
        }

        Ok(ProjectSummary {
            name: project.name().to_string(),
            features,
            completed_at: chrono::Utc::now(),
        })
    }

    async fn evaluate_feature(
        &self,
        project: &ProjectDeclaration,
        feature: &Feature,
    ) -> EvaluationResult<FeatureSummary> {
        // Configuration problems surface here, before any chain is scheduled
        let processor = self
            .processors
            .configure(project, project.output_categories())?;

        let pools = self.retriever.pools(project, feature).await?;
        debug!(
            "Scheduling {} slices for feature '{}'",
            pools.len(),
            feature
        );

        let accumulator = Arc::new(StatisticsAccumulator::new());
        let mut batch = FailFastSet::new();
        let cancel = batch.cancellation();

        for pending in pools {
            let chain = SliceChain::new(
                feature.clone(),
                pending,
                processor.clone(),
                accumulator.clone(),
                self.incremental.clone(),
                cancel.clone(),
            );
            batch.spawn(&self.pool, chain.run())?;
        }

        let outcomes = batch.join_all().await?;

        let statistics = accumulator.seal();
        if statistics.is_empty() {
            info!("No statistics were produced for feature '{}'.", feature);
        } else {
            for consumer in &self.consumers {
                consumer.accept(feature, &statistics).await?;
            }
        }

        Ok(FeatureSummary {
            feature: feature.clone(),
            slices_completed: outcomes.len(),
            statistics_count: statistics.total_size(),
            metrics: statistics.metric_names(),
        })
    }

    /// Graceful shutdown of the shared worker pool
    pub async fn shutdown(&self) -> ShutdownReport {
        self.pool.shutdown().await
    }

    /// Bounded-wait shutdown: graceful up to `timeout`, then forced
    pub async fn force_shutdown(&self, timeout: Duration) -> ShutdownReport {
        self.pool.force_shutdown(timeout).await
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }
}
