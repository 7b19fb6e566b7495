//! Error types for catpix.
//!
//! One enum covers the whole pipeline: catalog transport failures,
//! database errors, and user-input validation. Absence ("not found") is
//! never an error — lookups return `Ok(None)` or an empty page instead.

use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending input field (e.g. "id", "page", "tag").
    pub field: String,
    /// Human-readable description of the rule that failed.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Main error type for catpix operations.
#[derive(Debug, Error)]
pub enum CatpixError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// The catalog responded but had no records to offer. The ingestion
    /// run is aborted and nothing is persisted.
    #[error("Catalog returned no records")]
    EmptySource,

    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // User input errors
    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    // Programmer errors (contract violations, never user-facing)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for catpix operations.
pub type Result<T> = std::result::Result<T, CatpixError>;

// Conversion implementations for common error types

impl From<std::io::Error> for CatpixError {
    fn from(err: std::io::Error) -> Self {
        CatpixError::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for CatpixError {
    fn from(err: serde_json::Error) -> Self {
        CatpixError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for CatpixError {
    fn from(err: rusqlite::Error) -> Self {
        CatpixError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl CatpixError {
    /// Build a validation error for a single field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CatpixError::Validation(vec![FieldError::new(field, message)])
    }

    /// Whether this error came from malformed user input.
    pub fn is_validation(&self) -> bool {
        matches!(self, CatpixError::Validation(_))
    }

    /// Whether this error means the source catalog was unreachable.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, CatpixError::Network { .. } | CatpixError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatpixError::EmptySource;
        assert_eq!(err.to_string(), "Catalog returned no records");
    }

    #[test]
    fn test_timeout_display_carries_duration() {
        let err = CatpixError::Timeout(std::time::Duration::from_secs(15));
        assert_eq!(err.to_string(), "Request timeout after 15s");
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let err = CatpixError::Validation(vec![
            FieldError::new("page", "must be a positive integer"),
            FieldError::new("pageSize", "must be a positive integer"),
        ]);
        let text = err.to_string();
        assert!(text.contains("page: must be a positive integer"));
        assert!(text.contains("pageSize: must be a positive integer"));
    }

    #[test]
    fn test_classification_helpers() {
        assert!(CatpixError::validation("id", "bad").is_validation());
        assert!(CatpixError::Timeout(std::time::Duration::from_secs(5)).is_source_unavailable());
        assert!(!CatpixError::EmptySource.is_source_unavailable());
    }
}
