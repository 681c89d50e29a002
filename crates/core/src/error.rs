//! Error types for sectiondb.
//!
//! This module defines a unified error enum that covers all error categories
//! in the workspace: configuration, I/O, transport, remote database, schema
//! and input validation.

use thiserror::Error;

/// Unified error type for sectiondb.
///
/// All library functions return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport errors talking to the database server
    #[error("HTTP error: {0}")]
    Http(String),

    /// Errors reported by the Milvus server itself
    #[error("Milvus error (code {code}): {message}")]
    Milvus { code: i64, message: String },

    /// Collection schema or result-shape errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid caller input (dimension mismatch, zero top-k, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An operation did not finish before its deadline
    #[error("Timed out: {0}")]
    Timeout(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milvus_error_display() {
        let err = AppError::Milvus {
            code: 100,
            message: "collection not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Milvus error (code 100): collection not found"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = AppError::Timeout("loading 'docs'".to_string());
        assert_eq!(err.to_string(), "Timed out: loading 'docs'");
    }

    #[test]
    fn test_json_error_conversion() {
        let err: AppError = serde_json::from_str::<Vec<u32>>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
