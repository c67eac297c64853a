//! Error types for tfluent core operations.
//!
//! These errors cover loading plan and output documents. Assertion failures are
//! not errors of this kind; they are reported through
//! [`AssertionError`](crate::AssertionError).

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading plan or output documents.
#[derive(Error, Debug)]
pub enum Error {
    /// A document could not be read from disk.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path to the document.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document was not valid JSON or did not match the expected shape.
    #[error("Failed to parse {document}: {source}")]
    Json {
        /// Kind of document being parsed (e.g. "plan", "outputs").
        document: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed, but its content is unusable.
    #[error("Invalid {document}: {reason}")]
    InvalidDocument {
        /// Kind of document being parsed.
        document: &'static str,
        /// Reason the document is invalid.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let err = Error::Io {
            path: PathBuf::from("plan.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.to_string(), "Failed to read plan.json: no such file");
    }

    #[test]
    fn test_error_display_json() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::Json {
            document: "plan",
            source,
        };
        assert!(err.to_string().starts_with("Failed to parse plan: "));
    }

    #[test]
    fn test_error_display_invalid_document() {
        let err = Error::InvalidDocument {
            document: "plan",
            reason: "unsupported format_version 2.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid plan: unsupported format_version 2.0"
        );
    }
}
