/*!
# Evaluation Error Handling

This module provides the error types for the evaluation pipeline. All
pipeline operations return well-structured errors with enough context to
attribute a failure to the slice, metric or project that produced it.

## Error Categories

- **Configuration Errors**: the declaration requests a metric or output
  combination the processor cannot satisfy; detected before scheduling
- **Ingestion Errors**: source time-series data could not be ingested
- **Retrieval Errors**: failure obtaining paired data for one slice
- **Compute Errors**: the metric processor rejected an input
- **Interrupted Errors**: cooperative cancellation observed mid-chain
- **Internal Errors**: a defect, such as a duplicate-key insertion into a
  statistics store; these fail loudly rather than silently overwriting

## Propagation

A chain failure aborts that chain only; the fail-fast combinator turns the
first such failure into the failure of the whole feature batch; the
orchestrator turns a feature failure into failure of that project. Every
failure path carries its cause through to the top-level `ExecutionResult`.
*/

use std::fmt;

/// Error types for evaluation pipeline operations.
///
/// Each variant includes the context relevant to its failure mode, so a
/// top-level caller can report which slice, metric or project failed without
/// re-parsing message strings.
#[derive(Debug, Clone)]
pub enum EvaluationError {
    /// The declaration requests something the pipeline cannot satisfy.
    ///
    /// Detected before any chain is scheduled; fatal to the affected
    /// feature and never retried.
    Configuration {
        /// Description of the declaration problem
        message: String,
    },

    /// Source time-series data could not be ingested.
    ///
    /// Raised by the ingestion collaborator before any feature of the
    /// affected project is processed.
    Ingestion {
        /// Description of the ingest failure
        message: String,
        /// Name of the project whose ingest failed, if known
        project: Option<String>,
    },

    /// Paired data could not be retrieved for one slice.
    ///
    /// Fatal to its chain; retry policy, if any, belongs to the retrieval
    /// collaborator.
    Retrieval {
        /// Description of the retrieval failure
        message: String,
        /// The time slice being retrieved, if known
        time_slice: Option<String>,
    },

    /// The metric processor raised an error for a given input.
    Compute {
        /// Description of the compute failure
        message: String,
        /// Name of the metric being computed, if known
        metric: Option<String>,
    },

    /// Cooperative cancellation was observed mid-chain.
    ///
    /// Treated as a chain failure and propagated rather than swallowed.
    Interrupted {
        /// Where the cancellation was observed
        message: String,
    },

    /// A defect, not a runtime condition.
    ///
    /// Examples: a duplicate-key insertion into a statistics store, or a
    /// panicked evaluation task. Indicates a planning error upstream.
    Internal {
        /// Description of the defect
        message: String,
    },
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::Configuration { message } => {
                write!(f, "Configuration error: {}", message)
            }
            EvaluationError::Ingestion { message, project } => {
                if let Some(name) = project {
                    write!(f, "Ingestion error for project '{}': {}", name, message)
                } else {
                    write!(f, "Ingestion error: {}", message)
                }
            }
            EvaluationError::Retrieval {
                message,
                time_slice,
            } => {
                if let Some(slice) = time_slice {
                    write!(f, "Retrieval error for slice {}: {}", slice, message)
                } else {
                    write!(f, "Retrieval error: {}", message)
                }
            }
            EvaluationError::Compute { message, metric } => {
                if let Some(name) = metric {
                    write!(f, "Compute error for metric '{}': {}", name, message)
                } else {
                    write!(f, "Compute error: {}", message)
                }
            }
            EvaluationError::Interrupted { message } => {
                write!(f, "Interrupted: {}", message)
            }
            EvaluationError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for EvaluationError {}

impl EvaluationError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        EvaluationError::Configuration {
            message: message.into(),
        }
    }

    /// Create an ingestion error
    pub fn ingestion(message: impl Into<String>, project: Option<String>) -> Self {
        EvaluationError::Ingestion {
            message: message.into(),
            project,
        }
    }

    /// Create a retrieval error
    pub fn retrieval(message: impl Into<String>, time_slice: Option<String>) -> Self {
        EvaluationError::Retrieval {
            message: message.into(),
            time_slice,
        }
    }

    /// Create a compute error
    pub fn compute(message: impl Into<String>, metric: Option<String>) -> Self {
        EvaluationError::Compute {
            message: message.into(),
            metric,
        }
    }

    /// Create an interrupted error
    pub fn interrupted(message: impl Into<String>) -> Self {
        EvaluationError::Interrupted {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        EvaluationError::Internal {
            message: message.into(),
        }
    }

    /// True when this error reports cooperative cancellation rather than a
    /// hard failure
    pub fn is_interrupted(&self) -> bool {
        matches!(self, EvaluationError::Interrupted { .. })
    }

    /// True when this error reports a defect rather than a runtime condition
    pub fn is_internal(&self) -> bool {
        matches!(self, EvaluationError::Internal { .. })
    }

    /// True when this error reports a declaration problem
    pub fn is_configuration(&self) -> bool {
        matches!(self, EvaluationError::Configuration { .. })
    }
}

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = EvaluationError::retrieval("upstream store unavailable", Some("lead 42h".into()));
        assert_eq!(
            err.to_string(),
            "Retrieval error for slice lead 42h: upstream store unavailable"
        );

        let err = EvaluationError::compute("sample too small", None);
        assert_eq!(err.to_string(), "Compute error: sample too small");
    }

    #[test]
    fn test_predicates() {
        assert!(EvaluationError::interrupted("stop").is_interrupted());
        assert!(EvaluationError::internal("dup key").is_internal());
        assert!(EvaluationError::configuration("bad metric").is_configuration());
        assert!(!EvaluationError::configuration("bad metric").is_interrupted());
    }
}
