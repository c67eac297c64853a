//! Value references and the assertion engine.
//!
//! A [`ValueRef`] names a value ("which value, in which context"), records
//! whether it was found, and carries the value itself. Lookups never fail:
//! absence is recorded and only reported when an assertion runs. Queries
//! refine a reference into a new one; errors they encounter are deferred
//! until the end of the chain.
//!
//! ```rust
//! use serde_json::json;
//! use tfluent_core::{CheckExt, ValueRef};
//!
//! let attrs = json!({"input": {"test_key": {"nested_key": "test_nested"}}});
//! let input = ValueRef::lookup("azapi_resource.test", attrs.as_object().unwrap(), "input");
//!
//! input.query("test_key.nested_key").has_value("test_nested").error_is_nil();
//! input.query("not_exists").exists().error_contains("not found");
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::assertion::{AssertionError, Check, ErrorKind};
use crate::query;
use crate::value::{values_equal, Expected, Rendered};

/// A located (or not located) value plus the path used to describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRef {
    reference: String,
    exists: bool,
    value: Value,
    deferred: Option<AssertionError>,
}

impl ValueRef {
    /// Creates a reference to a value that was found.
    #[must_use]
    pub fn found(reference: impl Into<String>, value: Value) -> Self {
        Self {
            reference: reference.into(),
            exists: true,
            value,
            deferred: None,
        }
    }

    /// Creates a reference to a value that does not exist.
    #[must_use]
    pub fn missing(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            exists: false,
            value: Value::Null,
            deferred: None,
        }
    }

    /// Creates a reference from an optional value.
    #[must_use]
    pub fn from_option(reference: impl Into<String>, value: Option<&Value>) -> Self {
        match value {
            Some(v) => Self::found(reference, v.clone()),
            None => Self::missing(reference),
        }
    }

    /// Looks up `name` in `container`, producing the reference
    /// `"<context>.<name>"`.
    #[must_use]
    pub fn lookup(context: &str, container: &Map<String, Value>, name: &str) -> Self {
        Self::from_option(format!("{context}.{name}"), container.get(name))
    }

    /// Returns the diagnostic path of this reference.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns whether the value was found and no error is pending.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.exists && self.deferred.is_none()
    }

    /// Returns the error captured earlier in the chain, if any.
    #[must_use]
    pub const fn deferred_error(&self) -> Option<&AssertionError> {
        self.deferred.as_ref()
    }

    fn require_found(&self) -> Check {
        if let Some(err) = &self.deferred {
            return Err(err.clone());
        }
        if !self.exists {
            return Err(AssertionError::not_found(&self.reference));
        }
        Ok(())
    }

    /// Fails unless the value was found.
    ///
    /// # Errors
    ///
    /// Returns the deferred error, or a not-found error.
    pub fn exists(&self) -> Check {
        self.require_found()
    }

    /// Fails if the value was found.
    ///
    /// # Errors
    ///
    /// Returns the deferred error, or a found-when-not-expected error.
    pub fn does_not_exist(&self) -> Check {
        if let Some(err) = &self.deferred {
            return Err(err.clone());
        }
        if self.exists {
            return Err(AssertionError::found(&self.reference));
        }
        Ok(())
    }

    /// Fails unless the value equals `expected`.
    ///
    /// Numbers compare by value, so `has_value(2)` matches a stored `2.0`.
    ///
    /// # Errors
    ///
    /// Returns the deferred or not-found error, an invalid-comparison error
    /// when `expected` is a function value, or a mismatch error.
    pub fn has_value(&self, expected: impl Into<Expected>) -> Check {
        self.require_found()?;
        let (expected, equal) = compare(expected.into(), &self.value)?;
        if !equal {
            return Err(AssertionError::new(
                ErrorKind::AssertionMismatch,
                format!(
                    "{}: expected value {} not equal to actual {}",
                    self.reference,
                    Rendered(&expected),
                    Rendered(&self.value)
                ),
            ));
        }
        Ok(())
    }

    /// Fails unless the value is a string containing `expected`.
    ///
    /// # Errors
    ///
    /// Returns the deferred or not-found error, a type-mismatch error when the
    /// value is not a string, or a mismatch error.
    pub fn contains_string(&self, expected: &str) -> Check {
        self.require_found()?;
        let Value::String(actual) = &self.value else {
            return Err(AssertionError::new(
                ErrorKind::TypeMismatch,
                format!("{}: cannot convert value to string", self.reference),
            ));
        };
        if !actual.contains(expected) {
            return Err(AssertionError::new(
                ErrorKind::AssertionMismatch,
                format!(
                    "{}: expected value {expected} not contained within {actual}",
                    self.reference
                ),
            ));
        }
        Ok(())
    }

    /// Hands the raw JSON text of a string value to `assertion`.
    ///
    /// The text is passed undecoded; the assertion usually deserializes it
    /// into whatever shape it expects. Only `Ok(Some(true))` counts as
    /// success.
    ///
    /// # Errors
    ///
    /// Returns the deferred or not-found error, an error when the value is
    /// null or empty, a type-mismatch error when it is not a string, or a
    /// predicate failure when the assertion errors or does not return
    /// `Some(true)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use tfluent_core::{CheckExt, ValueRef};
    ///
    /// let content = ValueRef::found("local_file.test.content", json!(r#"{"test":"test"}"#));
    /// content
    ///     .contains_json_value(|raw| {
    ///         let doc: serde_json::Value = serde_json::from_slice(raw)?;
    ///         Ok::<_, serde_json::Error>(Some(doc["test"] == "test"))
    ///     })
    ///     .error_is_nil();
    /// ```
    pub fn contains_json_value<F, E>(&self, assertion: F) -> Check
    where
        F: FnOnce(&[u8]) -> Result<Option<bool>, E>,
        E: std::fmt::Display,
    {
        self.require_found()?;
        let reference = &self.reference;
        check_json_text(&self.value, assertion, |failure| match failure {
            JsonFailure::Empty => format!("{reference}: is empty"),
            JsonFailure::NotString => format!("{reference}: value is not a string"),
            JsonFailure::Errored { text, error } => {
                format!("{reference}: asserting value for {text:?}: {error}")
            }
            JsonFailure::Rejected { text } => format!("{reference}: assertion failed for {text:?}"),
        })
    }

    /// Returns the value.
    ///
    /// # Errors
    ///
    /// Returns the deferred or not-found error.
    pub fn get_value(&self) -> Result<&Value, AssertionError> {
        self.require_found()?;
        Ok(&self.value)
    }

    /// Consumes the reference, returning the value.
    ///
    /// # Errors
    ///
    /// Returns the deferred or not-found error.
    pub fn into_value(self) -> Result<Value, AssertionError> {
        self.require_found()?;
        Ok(self.value)
    }

    /// Evaluates `path` against the value and returns a reference to the
    /// result.
    ///
    /// String values are parsed as JSON text first, so queries reach into
    /// JSON embedded in attributes. The new reference is
    /// `"<reference>?<path>"`. See [`query`](crate::query) for the path
    /// syntax.
    ///
    /// A missing or errored reference is returned unchanged. Invalid JSON
    /// text or an invalid JSONPath expression produce a deferred error that
    /// surfaces at the next assertion. A path that matches nothing, or that
    /// matches an explicit `null`, produces a missing reference without an
    /// error.
    #[must_use]
    pub fn query(&self, path: &str) -> Self {
        if self.require_found().is_err() {
            return self.clone();
        }
        let reference = format!("{}?{path}", self.reference);

        let document = match query::as_document(&self.value) {
            Ok(document) => document,
            Err(e) => {
                debug!(reference = %reference, error = %e, "value is not valid JSON");
                return Self::errored(
                    reference.clone(),
                    AssertionError::new(
                        ErrorKind::MalformedJson,
                        format!(
                            "{reference}: actual value {} not valid JSON",
                            Rendered(&self.value)
                        ),
                    ),
                );
            }
        };

        match query::select(&document, path) {
            Ok(Some(Value::Null) | None) => {
                debug!(reference = %reference, "query matched nothing");
                Self::missing(reference)
            }
            Ok(Some(value)) => Self::found(reference, value),
            Err(e) => Self::errored(
                reference.clone(),
                AssertionError::new(ErrorKind::InvalidQuery, format!("{reference}: {e}")),
            ),
        }
    }

    fn errored(reference: String, err: AssertionError) -> Self {
        Self {
            reference,
            exists: false,
            value: Value::Null,
            deferred: Some(err),
        }
    }
}

/// Why a JSON text assertion failed, for callers to phrase.
pub(crate) enum JsonFailure<'a> {
    /// The value is null or an empty string.
    Empty,
    /// The value is not a string.
    NotString,
    /// The assertion returned an error.
    Errored { text: &'a str, error: String },
    /// The assertion returned `None` or `Some(false)`.
    Rejected { text: &'a str },
}

/// Runs `assertion` over the raw JSON text held in `value`. Only
/// `Ok(Some(true))` succeeds; null and empty text never reach the assertion.
pub(crate) fn check_json_text<F, E>(
    value: &Value,
    assertion: F,
    message: impl FnOnce(JsonFailure<'_>) -> String,
) -> Check
where
    F: FnOnce(&[u8]) -> Result<Option<bool>, E>,
    E: std::fmt::Display,
{
    let text = match value {
        Value::Null => {
            return Err(AssertionError::new(
                ErrorKind::TypeMismatch,
                message(JsonFailure::Empty),
            ))
        }
        Value::String(s) if s.is_empty() => {
            return Err(AssertionError::new(
                ErrorKind::TypeMismatch,
                message(JsonFailure::Empty),
            ))
        }
        Value::String(s) => s.as_str(),
        _ => {
            return Err(AssertionError::new(
                ErrorKind::TypeMismatch,
                message(JsonFailure::NotString),
            ))
        }
    };
    match assertion(text.as_bytes()) {
        Ok(Some(true)) => Ok(()),
        Ok(_) => Err(AssertionError::new(
            ErrorKind::PredicateFailure,
            message(JsonFailure::Rejected { text }),
        )),
        Err(e) => Err(AssertionError::new(
            ErrorKind::PredicateFailure,
            message(JsonFailure::Errored {
                text,
                error: e.to_string(),
            }),
        )),
    }
}

/// Compares `expected` to `actual`, returning the expected value and whether
/// the two are equal. Function values are rejected before any comparison.
pub(crate) fn compare(
    expected: Expected,
    actual: &Value,
) -> Result<(Value, bool), AssertionError> {
    match expected {
        Expected::Value(expected) => {
            let equal = values_equal(&expected, actual);
            Ok((expected, equal))
        }
        Expected::Callable(name) => Err(AssertionError::new(
            ErrorKind::InvalidComparison,
            format!(
                "invalid operation: func {name} == {} (cannot take func type as argument)",
                Rendered(actual)
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::CheckExt;
    use serde_json::json;

    fn mock(value: Value) -> ValueRef {
        ValueRef::found("test_resource.test_key", value)
    }

    fn missing() -> ValueRef {
        ValueRef::missing("test_resource.test_key")
    }

    #[test]
    fn test_lookup() {
        let container = json!({"content": "test", "nothing": null});
        let map = container.as_object().unwrap();

        let found = ValueRef::lookup("local_file.test", map, "content");
        assert_eq!(found.reference(), "local_file.test.content");
        assert!(found.is_found());
        assert_eq!(found.get_value().unwrap(), &json!("test"));

        let null = ValueRef::lookup("local_file.test", map, "nothing");
        null.exists().error_is_nil();

        let absent = ValueRef::lookup("local_file.test", map, "not_exists");
        assert!(!absent.is_found());
        absent
            .exists()
            .error_contains("local_file.test.not_exists: not found when expected");
        absent.does_not_exist().error_is_nil();
    }

    #[test]
    fn test_query_map_key() {
        let mock = mock(json!({"test_map_key": "test"}));
        mock.query("test_map_key").has_value("test").error_is_nil();
    }

    #[test]
    fn test_query_nested_key_on_string_value() {
        let mock = mock(json!({"test_map_key": "test"}));
        mock.query("test_map_key.test_nested_key")
            .has_value("test")
            .error_contains("not found when expected");
    }

    #[test]
    fn test_query_nested_map() {
        let mock = mock(json!({"test_map_key": {"test_nested_key": "test"}}));
        mock.query("test_map_key.test_nested_key")
            .has_value("test")
            .error_is_nil();
    }

    #[test]
    fn test_query_not_exist() {
        let query = mock(json!({"test_map_key": "test"})).query("not_exist");
        assert_eq!(query.reference(), "test_resource.test_key?not_exist");
        query
            .has_value("nil")
            .error_contains("test_resource.test_key?not_exist: not found when expected");
        query.does_not_exist().error_is_nil();
    }

    #[test]
    fn test_query_null_match_is_missing() {
        let query = mock(json!({"a": null, "b": [null]})).query("a");
        query.does_not_exist().error_is_nil();
        query
            .exists()
            .error_contains("test_resource.test_key?a: not found when expected");
        assert!(!mock(json!({"b": [null]})).query("b.0").is_found());
        assert!(mock(json!({"b": [null]})).query("b.#").is_found());
    }

    #[test]
    fn test_query_length() {
        mock(json!({"test_list": ["test", "test2"]}))
            .query("test_list.#")
            .has_value(2)
            .error_is_nil();
    }

    #[test]
    fn test_query_escaped_json_string() {
        let actual = r#"{"properties":{"testProperty":{"testArray":["testArrayMember"]},"testProperty2":{"TestArray2":[]}}}"#;
        mock(json!(actual))
            .query("properties.testProperty.testArray.0")
            .has_value("testArrayMember")
            .error_is_nil();
    }

    #[test]
    fn test_query_json_string_nested_in_json_string() {
        let inner = json!({"value": {"sku": "Standard"}}).to_string();
        let outer = json!({"parameters": inner}).to_string();
        mock(json!(outer))
            .query("parameters")
            .query("value.sku")
            .has_value("Standard")
            .error_is_nil();
    }

    #[test]
    fn test_query_invalid_json() {
        let query = mock(json!("invalid json")).query(".");
        let err = query.has_value("nil").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedJson);
        assert!(err.message().contains("not valid JSON"));

        // The deferred error wins over every assertion, including absence.
        query.does_not_exist().error_contains("not valid JSON");
        query.exists().error_contains("not valid JSON");
        query.query("a").exists().error_contains("not valid JSON");
    }

    #[test]
    fn test_query_invalid_jsonpath() {
        let err = mock(json!({"a": 1})).query("$.a[").exists().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
    }

    #[test]
    fn test_query_on_missing_propagates() {
        let query = missing().query("a.b");
        assert_eq!(query.reference(), "test_resource.test_key");
        query.exists().error_contains("not found when expected");
    }

    #[test]
    fn test_query_does_not_mutate_original() {
        let original = mock(json!({"a": {"b": 1}}));
        let refined = original.query("a.b");
        assert_eq!(original.get_value().unwrap(), &json!({"a": {"b": 1}}));
        assert_eq!(refined.get_value().unwrap(), &json!(1));
    }

    #[test]
    fn test_contains_json_value_not_found() {
        missing()
            .contains_json_value(|_| Ok::<_, String>(Some(true)))
            .error_contains("not found when expected");
    }

    #[test]
    fn test_contains_json_value_not_string() {
        mock(json!(1))
            .contains_json_value(|_| Ok::<_, String>(Some(true)))
            .error_contains("value is not a string");
    }

    #[test]
    fn test_contains_json_value_array() {
        let check = mock(json!(r#"[{"test":"test"}]"#)).contains_json_value(|raw| -> Result<Option<bool>, &'static str> {
            let items: Vec<Value> =
                serde_json::from_slice(raw).map_err(|_| "JSON input is not an array")?;
            let first = items.first().ok_or("JSON input is empty")?;
            if first["test"] != "test" {
                return Err("JSON input key name is not equal to test");
            }
            Ok(Some(true))
        });
        check.error_is_nil();
    }

    #[test]
    fn test_contains_json_value_false() {
        mock(json!(r#"{"test":"test"}"#))
            .contains_json_value(|_| Ok::<_, String>(Some(false)))
            .error_contains("test_resource.test_key: assertion failed for");
    }

    #[test]
    fn test_contains_json_value_none() {
        let err = mock(json!(r#"{"test":"test"}"#))
            .contains_json_value(|_| Ok::<_, String>(None))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PredicateFailure);
    }

    #[test]
    fn test_contains_json_value_empty_never_calls_assertion() {
        for value in [json!(""), Value::Null] {
            mock(value)
                .contains_json_value(|_| -> Result<Option<bool>, String> {
                    panic!("assertion must not run on empty values")
                })
                .error_contains("test_resource.test_key: is empty");
        }
    }

    #[test]
    fn test_contains_json_value_error() {
        mock(json!(r#"{"test":"test"}"#))
            .contains_json_value(|_| Err("test error"))
            .error_contains("test error");
    }

    #[test]
    fn test_has_value() {
        mock(json!("test")).has_value("test").error_is_nil();
        mock(json!("test"))
            .has_value("not_test")
            .error_contains("expected value not_test not equal to actual test");
        missing()
            .has_value("not_test")
            .error_contains("test_resource.test_key: not found when expected");
    }

    #[test]
    fn test_has_value_numeric_coercion() {
        mock(json!(2.0)).has_value(2).error_is_nil();
        mock(json!(2)).has_value(2.0).error_is_nil();
        mock(json!("123")).has_value(123).error_not_nil();
    }

    #[test]
    fn test_has_value_callable() {
        let f = || {};
        let err = mock(json!("test"))
            .has_value(Expected::callable(&f))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidComparison);
        assert!(err.message().contains("invalid operation"));
        assert!(err.message().contains("cannot take func type as argument"));

        mock(Value::Null)
            .has_value(Expected::callable(&f))
            .error_contains("invalid operation");
    }

    #[test]
    fn test_contains_string() {
        let mock = mock(json!("contains string"));
        mock.contains_string("ains str").error_is_nil();
        mock.contains_string("not_found").error_contains(
            "expected value not_found not contained within contains string",
        );
        missing()
            .contains_string("ains str")
            .error_contains("not found when expected");
    }

    #[test]
    fn test_contains_string_not_a_string() {
        let err = mock(json!(["contains string"]))
            .contains_string("")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.message().contains("cannot convert value to string"));
    }

    #[test]
    fn test_exists_and_does_not_exist() {
        mock(json!("test")).exists().error_is_nil();
        missing().exists().error_contains("not found when expected");
        missing().does_not_exist().error_is_nil();
        mock(json!("test"))
            .does_not_exist()
            .error_contains("found when not expected");
    }

    #[test]
    fn test_get_value() {
        assert_eq!(mock(json!("test")).get_value().unwrap(), &json!("test"));
        let err = missing().get_value().unwrap_err();
        assert!(err.message().contains("not found when expected"));
        assert_eq!(mock(json!(1)).into_value().unwrap(), json!(1));
    }

    #[test]
    fn test_compare() {
        let (expected, equal) = compare(Expected::from(1), &json!(1.0)).unwrap();
        assert_eq!(expected, json!(1));
        assert!(equal);
        let f = |x: i32| x;
        assert!(compare(Expected::callable(&f), &json!(1)).is_err());
    }
}
