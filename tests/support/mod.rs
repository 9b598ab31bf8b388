//! Shared stub collaborators for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::TimeDelta;
use skillcast::skillcast::config::declaration::{Feature, ProjectDeclaration, StatisticCategory};
use skillcast::skillcast::consumer::{IncrementalConsumer, StatisticsConsumer, StatisticsSnapshot};
use skillcast::skillcast::datamodel::input::MetricInput;
use skillcast::skillcast::datamodel::statistic::{
    ComputedStatistic, MetricOutput, Statistic, StatisticMetadata,
};
use skillcast::skillcast::datamodel::store::FeatureStatistics;
use skillcast::skillcast::datamodel::threshold::ThresholdPair;
use skillcast::skillcast::datamodel::time_slice::TimeSlice;
use skillcast::skillcast::error::{EvaluationError, EvaluationResult};
use skillcast::skillcast::processor::{MetricProcessor, MetricProcessorFactory};
use skillcast::skillcast::retrieval::{PendingPool, PoolRetriever, TimeSeriesIngester};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Tracks how many retrievals run concurrently, and how many ran at all
#[derive(Default)]
pub struct ConcurrencyGauge {
    current: AtomicUsize,
    max: AtomicUsize,
    total: AtomicUsize,
}

impl ConcurrencyGauge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn enter(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    /// The highest concurrency observed
    pub fn max_seen(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }

    /// How many retrievals started
    pub fn total_fetches(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub enum PlannedOutcome {
    Pairs(Vec<(f64, f64)>),
    Fail(String),
}

/// One scripted retrieval for a stubbed feature
#[derive(Clone)]
pub struct PoolPlan {
    pub slice: TimeSlice,
    pub delay: Duration,
    pub outcome: PlannedOutcome,
}

impl PoolPlan {
    pub fn ok(lead_hours: i64, pairs: Vec<(f64, f64)>) -> Self {
        Self::ok_after(lead_hours, Duration::ZERO, pairs)
    }

    pub fn ok_after(lead_hours: i64, delay: Duration, pairs: Vec<(f64, f64)>) -> Self {
        Self {
            slice: TimeSlice::of_lead(TimeDelta::hours(lead_hours)),
            delay,
            outcome: PlannedOutcome::Pairs(pairs),
        }
    }

    pub fn fail_after(lead_hours: i64, delay: Duration, message: impl Into<String>) -> Self {
        Self {
            slice: TimeSlice::of_lead(TimeDelta::hours(lead_hours)),
            delay,
            outcome: PlannedOutcome::Fail(message.into()),
        }
    }
}

struct StubPendingPool {
    feature: Feature,
    plan: PoolPlan,
    gauge: Option<Arc<ConcurrencyGauge>>,
}

#[async_trait]
impl PendingPool for StubPendingPool {
    fn time_slice(&self) -> TimeSlice {
        self.plan.slice.clone()
    }

    async fn fetch(&self) -> EvaluationResult<MetricInput> {
        if let Some(gauge) = &self.gauge {
            gauge.enter();
        }

        tokio::time::sleep(self.plan.delay).await;

        let result = match &self.plan.outcome {
            PlannedOutcome::Pairs(pairs) => Ok(MetricInput::new(
                self.feature.clone(),
                self.plan.slice.clone(),
                pairs.clone(),
                "CMS",
            )),
            PlannedOutcome::Fail(message) => Err(EvaluationError::retrieval(
                message.clone(),
                Some(self.plan.slice.to_string()),
            )),
        };

        if let Some(gauge) = &self.gauge {
            gauge.exit();
        }

        result
    }
}

/// Scripted retrieval collaborator: hand it the plans per feature up front
#[derive(Default)]
pub struct StubRetriever {
    plans: HashMap<String, Vec<PoolPlan>>,
    gauge: Option<Arc<ConcurrencyGauge>>,
}

impl StubRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(mut self, feature: &str, plans: Vec<PoolPlan>) -> Self {
        self.plans.insert(feature.to_string(), plans);
        self
    }

    pub fn with_gauge(mut self, gauge: Arc<ConcurrencyGauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }
}

#[async_trait]
impl PoolRetriever for StubRetriever {
    async fn pools(
        &self,
        _project: &ProjectDeclaration,
        feature: &Feature,
    ) -> EvaluationResult<Vec<Box<dyn PendingPool>>> {
        let plans = self.plans.get(feature.name()).cloned().unwrap_or_default();

        Ok(plans
            .into_iter()
            .map(|plan| {
                Box::new(StubPendingPool {
                    feature: feature.clone(),
                    plan,
                    gauge: self.gauge.clone(),
                }) as Box<dyn PendingPool>
            })
            .collect())
    }
}

/// Ingestion stub that counts invocations and optionally fails
#[derive(Default)]
pub struct StubIngester {
    calls: AtomicUsize,
    fail_message: Option<String>,
}

impl StubIngester {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_message: Some(message.into()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimeSeriesIngester for StubIngester {
    async fn ingest(&self, project: &ProjectDeclaration) -> EvaluationResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.fail_message {
            Some(message) => Err(EvaluationError::ingestion(
                message.clone(),
                Some(project.name().to_string()),
            )),
            None => Ok(()),
        }
    }
}

/// The value the stub processor produces for a set of pairs
pub fn mean_error(pairs: &[(f64, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    pairs
        .iter()
        .map(|(observed, predicted)| predicted - observed)
        .sum::<f64>()
        / pairs.len() as f64
}

struct StubProcessor {
    metrics: Vec<String>,
}

impl MetricProcessor for StubProcessor {
    fn apply(&self, input: &MetricInput) -> EvaluationResult<Vec<ComputedStatistic>> {
        let value = mean_error(input.pairs());

        Ok(self
            .metrics
            .iter()
            .map(|metric| {
                ComputedStatistic::new(
                    metric.clone(),
                    ThresholdPair::all_data(),
                    MetricOutput::of(
                        Statistic::Score(value),
                        StatisticMetadata::new(metric.clone(), input.len(), input.unit()),
                    ),
                )
            })
            .collect())
    }
}

/// Processor factory producing a mean-error scorer per declared metric;
/// optionally rejects configuration for a named project
#[derive(Default)]
pub struct StubProcessorFactory {
    reject_project: Option<String>,
}

impl StubProcessorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(project: &str) -> Self {
        Self {
            reject_project: Some(project.to_string()),
        }
    }
}

impl MetricProcessorFactory for StubProcessorFactory {
    fn configure(
        &self,
        project: &ProjectDeclaration,
        _categories: &[StatisticCategory],
    ) -> EvaluationResult<Arc<dyn MetricProcessor>> {
        if self.reject_project.as_deref() == Some(project.name()) {
            return Err(EvaluationError::configuration(format!(
                "metrics {:?} are not supported for project '{}'",
                project.metrics(),
                project.name()
            )));
        }

        Ok(Arc::new(StubProcessor {
            metrics: project.metrics().to_vec(),
        }))
    }
}

/// Records every sealed feature hand-off
#[derive(Default)]
pub struct CollectingConsumer {
    received: Mutex<Vec<(Feature, FeatureStatistics)>>,
}

impl CollectingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<(Feature, FeatureStatistics)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatisticsConsumer for CollectingConsumer {
    async fn accept(
        &self,
        feature: &Feature,
        statistics: &FeatureStatistics,
    ) -> EvaluationResult<()> {
        self.received
            .lock()
            .unwrap()
            .push((feature.clone(), statistics.clone()));
        Ok(())
    }
}

/// Records every incremental snapshot
#[derive(Default)]
pub struct CollectingIncremental {
    snapshots: Mutex<Vec<StatisticsSnapshot>>,
}

impl CollectingIncremental {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<StatisticsSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

#[async_trait]
impl IncrementalConsumer for CollectingIncremental {
    async fn accept(&self, snapshot: StatisticsSnapshot) -> EvaluationResult<()> {
        self.snapshots.lock().unwrap().push(snapshot);
        Ok(())
    }
}
