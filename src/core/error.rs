//! Library error type

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T, E = ProcurementError> = std::result::Result<T, E>;

/// Errors surfaced by the store and the procurement engine
///
/// Storage failures are passed through unchanged; the engine never retries.
#[derive(Debug, Error, Diagnostic)]
pub enum ProcurementError {
    #[error("{entity} with id '{id}' not found")]
    #[diagnostic(code(buyer::not_found))]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    #[diagnostic(code(buyer::storage))]
    Storage(#[from] rusqlite::Error),

    #[error("dataset error: {message}")]
    #[diagnostic(
        code(buyer::dataset),
        help("references inside a dataset are resolved by name; check spelling and ordering")
    )]
    Dataset { message: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(buyer::io))]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    #[diagnostic(code(buyer::config))]
    Yaml(#[from] serde_yml::Error),
}

impl ProcurementError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// True for the `NotFound` variant
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ProcurementError::not_found("Project", 42);
        assert_eq!(err.to_string(), "Project with id '42' not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let inner = rusqlite::Error::QueryReturnedNoRows;
        let expected = inner.to_string();
        let err = ProcurementError::from(inner);
        assert_eq!(err.to_string(), expected);
        assert!(!err.is_not_found());
    }
}
