//! YAML Declaration Loader
//!
//! Loads an evaluation declaration from a YAML document and validates it
//! before the engine sees it. A declaration that parses but fails validation
//! is rejected here, so the engine only ever receives declarations it can
//! schedule.
//!
//! ## Usage
//!
//! ```yaml
//! projects:
//!   - name: baseline
//!     features: [DRRC2, DOLC2]
//!     metrics: [mean_error, mean_absolute_error]
//!     output_categories: [score]
//! ```

use crate::skillcast::config::declaration::Declaration;
use crate::skillcast::error::EvaluationError;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a declaration document.
#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("failed to read declaration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse declaration YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid declaration: {0}")]
    Invalid(String),
}

impl From<DeclarationError> for EvaluationError {
    fn from(error: DeclarationError) -> Self {
        EvaluationError::configuration(error.to_string())
    }
}

/// Load and validate a declaration from a YAML file
pub fn load_declaration(path: impl AsRef<Path>) -> Result<Declaration, DeclarationError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| DeclarationError::Io {
        path: path.display().to_string(),
        source,
    })?;

    declaration_from_str(&raw)
}

/// Parse and validate a declaration from a YAML string
pub fn declaration_from_str(yaml: &str) -> Result<Declaration, DeclarationError> {
    let declaration: Declaration = serde_yaml::from_str(yaml)?;

    declaration
        .validate()
        .map_err(|e| DeclarationError::Invalid(e.to_string()))?;

    Ok(declaration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_declaration() {
        let yaml = r#"
projects:
  - name: baseline
    features: [DRRC2, DOLC2]
    metrics: [mean_error]
"#;

        let declaration = declaration_from_str(yaml).unwrap();
        assert_eq!(declaration.projects().len(), 1);

        let project = &declaration.projects()[0];
        assert_eq!(project.name(), "baseline");
        assert_eq!(project.features().len(), 2);
        assert_eq!(project.metrics().len(), 1);
        assert_eq!(project.metrics()[0], "mean_error");
    }

    #[test]
    fn test_invalid_declaration_rejected_on_load() {
        // Features without metrics fail validation, not just parsing
        let yaml = r#"
projects:
  - name: baseline
    features: [DRRC2]
"#;

        let err = declaration_from_str(yaml).unwrap_err();
        assert!(matches!(err, DeclarationError::Invalid(_)));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = declaration_from_str("projects: [unclosed").unwrap_err();
        assert!(matches!(err, DeclarationError::Parse(_)));
    }
}
