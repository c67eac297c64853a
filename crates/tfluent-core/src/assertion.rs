//! Assertion outcomes.
//!
//! Every assertion in this crate returns a [`Check`], which is `Ok(())` on
//! success and an [`AssertionError`] describing the failure otherwise. The
//! [`CheckExt`] trait turns a `Check` into test failures.

use std::fmt;

use thiserror::Error;

/// Outcome of a single assertion.
pub type Check = std::result::Result<(), AssertionError>;

/// Category of an assertion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The referenced resource, attribute, output or query result is absent.
    NotFound,
    /// The referenced item is present although absence was required.
    FoundWhenNotExpected,
    /// One side of an equality check cannot be compared.
    InvalidComparison,
    /// The value has the wrong type for the requested operation.
    TypeMismatch,
    /// The value was expected to be JSON text but is not.
    MalformedJson,
    /// The query expression could not be evaluated.
    InvalidQuery,
    /// A caller supplied predicate rejected the value or failed.
    PredicateFailure,
    /// Values were compared and differ.
    AssertionMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::FoundWhenNotExpected => "found when not expected",
            Self::InvalidComparison => "invalid comparison",
            Self::TypeMismatch => "type mismatch",
            Self::MalformedJson => "malformed JSON",
            Self::InvalidQuery => "invalid query",
            Self::PredicateFailure => "predicate failure",
            Self::AssertionMismatch => "assertion mismatch",
        };
        f.write_str(name)
    }
}

/// A failed assertion.
///
/// The message is formatted as `"<reference>: <failure description>"` where a
/// reference is available.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AssertionError {
    kind: ErrorKind,
    message: String,
}

impl AssertionError {
    /// Creates a new assertion error.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn not_found(reference: &str) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("{reference}: not found when expected"),
        )
    }

    pub(crate) fn found(reference: &str) -> Self {
        Self::new(
            ErrorKind::FoundWhenNotExpected,
            format!("{reference}: found when not expected"),
        )
    }
}

/// Test-framework integration for [`Check`] values.
///
/// Each method panics with a descriptive message when the expectation does
/// not hold, which fails the surrounding `#[test]`.
///
/// # Examples
///
/// ```rust
/// use tfluent_core::{CheckExt, ValueRef};
/// use serde_json::json;
///
/// let content = ValueRef::found("local_file.test.content", json!("test"));
/// content.has_value("test").error_is_nil();
/// content.has_value("other").error_contains("not equal to actual test");
/// ```
pub trait CheckExt {
    /// Returns the failure, if any.
    fn as_error(&self) -> Option<&AssertionError>;

    /// Panics if the assertion failed.
    fn error_is_nil(&self);

    /// Panics if the assertion succeeded.
    fn error_not_nil(&self);

    /// Panics unless the assertion failed with a message containing `substr`.
    fn error_contains(&self, substr: &str);

    /// Panics if the assertion failed with a message containing `substr`.
    fn error_not_contains(&self, substr: &str);
}

impl CheckExt for Check {
    fn as_error(&self) -> Option<&AssertionError> {
        self.as_ref().err()
    }

    #[track_caller]
    fn error_is_nil(&self) {
        if let Err(e) = self {
            panic!("{e}");
        }
    }

    #[track_caller]
    fn error_not_nil(&self) {
        assert!(self.is_err(), "error is nil");
    }

    #[track_caller]
    fn error_contains(&self, substr: &str) {
        match self {
            Ok(()) => panic!("error is nil, expected one containing '{substr}'"),
            Err(e) => assert!(
                e.message.contains(substr),
                "error '{}' does not contain substring '{substr}'",
                e.message
            ),
        }
    }

    #[track_caller]
    fn error_not_contains(&self, substr: &str) {
        if let Err(e) = self {
            assert!(
                !e.message.contains(substr),
                "error '{}' does contain substring '{substr}'",
                e.message
            );
        }
    }
}
