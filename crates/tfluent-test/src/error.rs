//! Error types for the tfluent check framework.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for check suite operations.
pub type Result<T> = std::result::Result<T, TestError>;

/// Errors that can occur while loading or running check suites.
///
/// A check that runs and fails is not an error; it is a failed
/// [`TestResult`](crate::TestResult).
#[derive(Error, Debug)]
pub enum TestError {
    /// Failed to read a suite file.
    #[error("Failed to read check suite {path}: {source}")]
    FileReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error with path context.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path involved in the operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a suite file.
    #[error("Failed to parse check suite {path}: {message}")]
    SuiteParseError {
        /// Path to the file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Discovery error.
    #[error("Check discovery failed: {0}")]
    Discovery(String),

    /// A check does not describe a runnable assertion.
    #[error("Invalid check '{name}': {reason}")]
    InvalidCheck {
        /// Name of the check.
        name: String,
        /// Why the check cannot run.
        reason: String,
    },

    /// Core error.
    #[error(transparent)]
    CoreError(#[from] tfluent_core::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TestError::InvalidCheck {
            name: "content".to_string(),
            reason: "equals requires a key or an output".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid check 'content': equals requires a key or an output"
        );
    }

    #[test]
    fn test_suite_parse_error() {
        let err = TestError::SuiteParseError {
            path: PathBuf::from("storage.checks.yaml"),
            message: "invalid YAML".to_string(),
        };
        assert!(err.to_string().contains("storage.checks.yaml"));
        assert!(err.to_string().contains("invalid YAML"));
    }
}
