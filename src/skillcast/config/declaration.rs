//! Evaluation declaration model
//!
//! A declaration describes what to evaluate: one or more projects, each with
//! its geographic features, the metrics to compute and the categories of
//! statistic to produce. Declarations are immutable once validated; the core
//! never mutates them.

use crate::skillcast::datamodel::threshold::ThresholdPair;
use crate::skillcast::error::{EvaluationError, EvaluationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An opaque identifier for one geographic evaluation unit.
///
/// Supplied by configuration and used verbatim as a grouping key; the core
/// attaches no meaning to its contents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feature(String);

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Feature(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Feature {
    fn from(name: &str) -> Self {
        Feature::new(name)
    }
}

/// The category of statistic a metric produces.
///
/// Declared per project so the processor factory can refuse combinations it
/// does not support before any work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticCategory {
    Score,
    Vector,
    MultiVector,
    Matrix,
    Paired,
    BoxPlot,
}

impl StatisticCategory {
    pub fn as_str(&self) -> &str {
        match self {
            StatisticCategory::Score => "score",
            StatisticCategory::Vector => "vector",
            StatisticCategory::MultiVector => "multi_vector",
            StatisticCategory::Matrix => "matrix",
            StatisticCategory::Paired => "paired",
            StatisticCategory::BoxPlot => "box_plot",
        }
    }
}

impl fmt::Display for StatisticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_output_categories() -> Vec<StatisticCategory> {
    vec![StatisticCategory::Score]
}

/// One declared evaluation project: features, metrics and output shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDeclaration {
    name: String,

    #[serde(default)]
    features: Vec<Feature>,

    /// Metric names, resolved by the metric-processor collaborator
    #[serde(default)]
    metrics: Vec<String>,

    #[serde(default = "default_output_categories")]
    output_categories: Vec<StatisticCategory>,

    /// Threshold pairs the processor should evaluate against, in addition to
    /// the implicit all-data threshold
    #[serde(default)]
    thresholds: Vec<ThresholdPair>,
}

impl ProjectDeclaration {
    /// Create a new project declaration with no features or metrics
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
            metrics: Vec::new(),
            output_categories: default_output_categories(),
            thresholds: Vec::new(),
        }
    }

    /// Add a feature
    pub fn with_feature(mut self, feature: impl Into<Feature>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Add a metric by name
    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metrics.push(metric.into());
        self
    }

    /// Replace the declared output categories
    pub fn with_output_categories(mut self, categories: Vec<StatisticCategory>) -> Self {
        self.output_categories = categories;
        self
    }

    /// Add a threshold pair
    pub fn with_threshold(mut self, thresholds: ThresholdPair) -> Self {
        self.thresholds.push(thresholds);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn output_categories(&self) -> &[StatisticCategory] {
        &self.output_categories
    }

    pub fn thresholds(&self) -> &[ThresholdPair] {
        &self.thresholds
    }
}

/// A complete evaluation declaration: one or more projects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(default)]
    projects: Vec<ProjectDeclaration>,
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project
    pub fn with_project(mut self, project: ProjectDeclaration) -> Self {
        self.projects.push(project);
        self
    }

    pub fn projects(&self) -> &[ProjectDeclaration] {
        &self.projects
    }

    /// Validate the declaration before evaluation.
    ///
    /// A project with zero features is valid and evaluates trivially; a
    /// project that declares features but no metrics is not, since every
    /// scheduled chain would have nothing to compute.
    pub fn validate(&self) -> EvaluationResult<()> {
        for project in &self.projects {
            if project.name.trim().is_empty() {
                return Err(EvaluationError::configuration(
                    "a declared project has an empty name",
                ));
            }

            let mut seen = BTreeSet::new();
            for feature in &project.features {
                if !seen.insert(feature) {
                    return Err(EvaluationError::configuration(format!(
                        "project '{}' declares feature '{}' more than once",
                        project.name, feature
                    )));
                }
            }

            if !project.features.is_empty() && project.metrics.is_empty() {
                return Err(EvaluationError::configuration(format!(
                    "project '{}' declares features but no metrics",
                    project.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_declaration_is_valid() {
        assert!(Declaration::new().validate().is_ok());
    }

    #[test]
    fn test_zero_feature_project_is_valid() {
        let declaration = Declaration::new().with_project(ProjectDeclaration::new("baseline"));
        assert!(declaration.validate().is_ok());
    }

    #[test]
    fn test_features_without_metrics_rejected() {
        let declaration = Declaration::new()
            .with_project(ProjectDeclaration::new("baseline").with_feature("DRRC2"));

        let err = declaration.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("no metrics"));
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let declaration = Declaration::new().with_project(
            ProjectDeclaration::new("baseline")
                .with_feature("DRRC2")
                .with_feature("DRRC2")
                .with_metric("mean_error"),
        );

        let err = declaration.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_empty_project_name_rejected() {
        let declaration = Declaration::new().with_project(ProjectDeclaration::new("  "));
        assert!(declaration.validate().is_err());
    }
}
