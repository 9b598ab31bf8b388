/*!
# Statistics Store

The queryable index of computed statistics. Two types share the work:

- [`StatisticStore`] — the immutable, read-many store keyed by
  [`ResultKey`] = (time slice, threshold pair). Every filter operation
  returns a new store; equality is equality of the entry sets, independent
  of insertion order.
- [`StatisticsAccumulator`] — the mutable companion used only during the
  concurrent phase. Chains insert into it from any worker; it is sealed
  into immutable per-metric stores before any reader sees it.

## Key scope

The key deliberately excludes the metric name: the accumulator partitions by
metric, producing one sealed store per metric per feature. Chains own
disjoint (metric, key) combinations by construction, so a duplicate
insertion indicates a planning defect and fails with an internal error
rather than overwriting either value.
*/

use crate::skillcast::datamodel::statistic::MetricOutput;
use crate::skillcast::datamodel::threshold::{Threshold, ThresholdPair};
use crate::skillcast::datamodel::time_slice::TimeSlice;
use crate::skillcast::error::{EvaluationError, EvaluationResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// The composite key of one stored statistic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResultKey {
    time_slice: TimeSlice,
    thresholds: ThresholdPair,
}

impl ResultKey {
    pub fn new(time_slice: TimeSlice, thresholds: ThresholdPair) -> Self {
        Self {
            time_slice,
            thresholds,
        }
    }

    pub fn time_slice(&self) -> &TimeSlice {
        &self.time_slice
    }

    pub fn thresholds(&self) -> &ThresholdPair {
        &self.thresholds
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.time_slice, self.thresholds)
    }
}

/// An immutable store of statistics keyed by (time slice, threshold pair).
///
/// Generic over the value type; the store never inspects the value's shape.
/// All query operations leave the source store untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticStore<T> {
    entries: BTreeMap<ResultKey, T>,
}

impl<T> Default for StatisticStore<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> StatisticStore<T> {
    /// An empty store
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ResultKey) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResultKey, &T)> {
        self.entries.iter()
    }

    /// The distinct time slices present in the store
    pub fn set_of_time_slices(&self) -> BTreeSet<TimeSlice> {
        self.entries
            .keys()
            .map(|key| key.time_slice().clone())
            .collect()
    }

    /// The distinct primary thresholds present in the store
    pub fn set_of_threshold_one(&self) -> BTreeSet<Threshold> {
        self.entries
            .keys()
            .map(|key| key.thresholds().first().clone())
            .collect()
    }

    /// The distinct secondary thresholds present in the store; empty when no
    /// entry carries one
    pub fn set_of_threshold_two(&self) -> BTreeSet<Threshold> {
        self.entries
            .keys()
            .filter_map(|key| key.thresholds().second().cloned())
            .collect()
    }

    /// True when any entry's primary threshold is quantile-derived
    pub fn has_quantile_thresholds(&self) -> bool {
        self.entries
            .keys()
            .any(|key| key.thresholds().first().is_quantile())
    }
}

impl<T: Clone> StatisticStore<T> {
    /// Build a store from an initial entry collection
    pub fn from_entries(entries: impl IntoIterator<Item = (ResultKey, T)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// The entries whose time slice equals `time_slice`, as a new store
    pub fn filter_by_time(&self, time_slice: &TimeSlice) -> StatisticStore<T> {
        self.filter(|key| key.time_slice() == time_slice)
    }

    /// The entries whose primary threshold equals `threshold`, as a new store
    pub fn filter_by_threshold_one(&self, threshold: &Threshold) -> StatisticStore<T> {
        self.filter(|key| key.thresholds().first() == threshold)
    }

    /// The entries whose secondary threshold equals `threshold`, as a new
    /// store; entries without a secondary threshold never match
    pub fn filter_by_threshold_two(&self, threshold: &Threshold) -> StatisticStore<T> {
        self.filter(|key| key.thresholds().second() == Some(threshold))
    }

    fn filter(&self, predicate: impl Fn(&ResultKey) -> bool) -> StatisticStore<T> {
        StatisticStore {
            entries: self
                .entries
                .iter()
                .filter(|(key, _)| predicate(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

/// The sealed per-feature results: one immutable store per metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureStatistics {
    by_metric: BTreeMap<String, StatisticStore<MetricOutput>>,
}

impl FeatureStatistics {
    /// The names of the metrics with at least one statistic
    pub fn metric_names(&self) -> Vec<String> {
        self.by_metric.keys().cloned().collect()
    }

    /// The sealed store for one metric
    pub fn store(&self, metric: &str) -> Option<&StatisticStore<MetricOutput>> {
        self.by_metric.get(metric)
    }

    /// Iterate (metric name, store) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StatisticStore<MetricOutput>)> {
        self.by_metric.iter()
    }

    /// The total number of statistics across all metrics
    pub fn total_size(&self) -> usize {
        self.by_metric.values().map(StatisticStore::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_metric.values().all(StatisticStore::is_empty)
    }
}

/// The concurrent-phase accumulator behind a feature's statistics.
///
/// Insertion is commutative and associative: the sealed content is
/// independent of the order in which chains complete. The lock guards only
/// map insertion; no I/O happens under it.
#[derive(Debug, Default)]
pub struct StatisticsAccumulator {
    inner: Mutex<BTreeMap<String, BTreeMap<ResultKey, MetricOutput>>>,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one statistic under (metric, key).
    ///
    /// A duplicate key under the same metric is a planning defect: the
    /// insertion fails with an internal error and neither value is
    /// discarded silently.
    pub fn insert(
        &self,
        metric: &str,
        key: ResultKey,
        output: MetricOutput,
    ) -> EvaluationResult<()> {
        let mut guard = self.inner.lock().map_err(|_| {
            EvaluationError::internal("statistics accumulator lock was poisoned by a panic")
        })?;

        let store = guard.entry(metric.to_string()).or_default();
        match store.entry(key) {
            std::collections::btree_map::Entry::Occupied(existing) => {
                Err(EvaluationError::internal(format!(
                    "duplicate statistic for metric '{}' at key {}",
                    metric,
                    existing.key()
                )))
            }
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(output);
                Ok(())
            }
        }
    }

    /// The total number of statistics accumulated so far
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the accumulator into immutable per-metric stores.
    ///
    /// Called once, after every chain for the feature has completed; readers
    /// only ever see the sealed stores.
    pub fn seal(&self) -> FeatureStatistics {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let drained = std::mem::take(&mut *guard);

        FeatureStatistics {
            by_metric: drained
                .into_iter()
                .map(|(metric, entries)| (metric, StatisticStore { entries }))
                .collect(),
        }
    }
}
