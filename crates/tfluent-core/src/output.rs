//! Terraform output documents.
//!
//! [`Outputs`] is built from the JSON produced by `terraform output -json`
//! after an apply.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::provider::OutputProvider;

/// A single output as reported by `terraform output -json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputValue {
    /// Whether the output is marked sensitive.
    #[serde(default)]
    pub sensitive: bool,
    /// Terraform type expression of the output.
    #[serde(rename = "type", default)]
    pub output_type: Value,
    /// The output value.
    #[serde(default)]
    pub value: Value,
}

impl OutputValue {
    /// Creates a non-sensitive output.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self {
            sensitive: false,
            output_type: Value::Null,
            value,
        }
    }
}

/// Applied output values keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outputs {
    values: BTreeMap<String, OutputValue>,
}

impl Outputs {
    /// Creates an empty set of outputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an output.
    #[must_use]
    pub fn with_output(mut self, name: impl Into<String>, output: OutputValue) -> Self {
        self.values.insert(name.into(), output);
        self
    }

    /// Parses outputs from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not an outputs document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| Error::Json {
            document: "outputs",
            source,
        })
    }

    /// Reads and parses an outputs file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loading outputs");
        Self::from_json_str(&content)
    }

    /// Returns the named output, including its metadata.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.values.get(name)
    }

    /// Returns the number of outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no outputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl OutputProvider for Outputs {
    fn output(&self, name: &str) -> Option<&Value> {
        self.values.get(name).map(|o| &o.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::CheckExt;
    use serde_json::json;

    const OUTPUTS: &str = r#"{
        "list": {"sensitive": false, "type": ["list", "string"], "value": ["a", "b"]},
        "number": {"sensitive": false, "type": "number", "value": 2},
        "secret": {"sensitive": true, "type": "string", "value": "hunter2"},
        "object": {"sensitive": false, "type": ["object", {"k": "string"}], "value": {"k": "v"}}
    }"#;

    #[test]
    fn test_parse_outputs() {
        let outputs = Outputs::from_json_str(OUTPUTS).unwrap();
        assert_eq!(outputs.len(), 4);
        assert!(outputs.get("secret").unwrap().sensitive);
        assert_eq!(outputs.get("number").unwrap().output_type, json!("number"));
    }

    #[test]
    fn test_output_assertions() {
        let outputs = Outputs::from_json_str(OUTPUTS).unwrap();
        outputs.output_ref("number").has_value(2.0).error_is_nil();
        outputs.output_ref("list").has_value(vec!["a", "b"]).error_is_nil();
        outputs.output_ref("object").query("k").has_value("v").error_is_nil();
        outputs
            .output_ref("missing")
            .exists()
            .error_contains("output.missing: not found when expected");
    }

    #[test]
    fn test_builder() {
        let outputs = Outputs::new().with_output("name", OutputValue::new(json!("x")));
        assert!(!outputs.is_empty());
        outputs.output_ref("name").has_value("x").error_is_nil();
    }

    #[test]
    fn test_invalid_outputs() {
        let err = Outputs::from_json_str("[]").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse outputs"));
    }
}
