//! Declarative checks.
//!
//! A check names a target (a resource, one of its attributes, or an output,
//! optionally refined by a query) and an expectation about it. Checks are
//! grouped into suites that can be written by hand in JSON or YAML:
//!
//! ```yaml
//! name: basic
//! checks:
//!   - name: four resources planned
//!     expect: { resource_count: 4 }
//!   - name: content is test
//!     resource: local_file.test
//!     key: content
//!     expect: { equals: test }
//!   - name: sku is standard
//!     resource: azapi_resource.test
//!     key: body
//!     query: properties.sku.name
//!     expect: { equals: Standard }
//!   - name: no stray file
//!     resource: local_file.stray
//!     expect: does_not_exist
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::discovery::FixtureFormat;
use crate::error::{Result, TestError};

/// What a check expects of its target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// The target exists.
    #[default]
    Exists,
    /// The target does not exist.
    DoesNotExist,
    /// The target equals the value.
    Equals(Value),
    /// The target is a string containing the substring.
    Contains(String),
    /// The plan contains exactly this many resources.
    ResourceCount(usize),
}

/// A single declarative check.
///
/// # Examples
///
/// ```rust
/// use tfluent_test::{CheckSpec, Expectation};
/// use serde_json::json;
///
/// let check = CheckSpec::new("content is test")
///     .with_resource("local_file.test")
///     .with_key("content")
///     .expect(Expectation::Equals(json!("test")));
///
/// assert!(check.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckSpec {
    /// Name of the check.
    pub name: String,

    /// Description of what this check verifies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Resource address the check targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Attribute of the resource the check targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Output the check targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Query applied to the attribute or output value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// The expectation.
    #[serde(default)]
    pub expect: Expectation,
}

impl CheckSpec {
    /// Creates a new check with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the check description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Targets a resource.
    #[must_use]
    pub fn with_resource(mut self, address: impl Into<String>) -> Self {
        self.resource = Some(address.into());
        self
    }

    /// Targets an attribute of the resource.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Targets an output.
    #[must_use]
    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.output = Some(name.into());
        self
    }

    /// Refines the target with a query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the expectation.
    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expect = expectation;
        self
    }

    /// Checks that the target and expectation fit together.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::InvalidCheck`] when the check cannot run.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(TestError::InvalidCheck {
                name: self.name.clone(),
                reason: reason.to_string(),
            })
        };

        if matches!(self.expect, Expectation::ResourceCount(_)) {
            return Ok(());
        }
        if self.resource.is_some() && self.output.is_some() {
            return invalid("a check targets either a resource or an output, not both");
        }
        if self.resource.is_none() && self.output.is_none() {
            return invalid("a check needs a resource or an output");
        }
        if self.key.is_some() && self.resource.is_none() {
            return invalid("key requires a resource");
        }
        if self.query.is_some() && self.key.is_none() && self.output.is_none() {
            return invalid("query requires a key or an output");
        }
        let value_expectation = matches!(
            self.expect,
            Expectation::Equals(_) | Expectation::Contains(_)
        );
        if value_expectation && self.key.is_none() && self.output.is_none() {
            return invalid("equals and contains require a key or an output");
        }
        Ok(())
    }
}

/// A named collection of checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckSuite {
    /// Name of the suite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The checks in this suite.
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

impl CheckSuite {
    /// Creates a new empty suite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the suite name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a check to the suite.
    #[must_use]
    pub fn add_check(mut self, check: CheckSpec) -> Self {
        self.checks.push(check);
        self
    }

    /// Returns the number of checks in this suite.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true if there are no checks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Parses a suite from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid suite.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a suite from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid suite.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a suite from a JSON or YAML file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TestError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let parsed = match FixtureFormat::from_path(path) {
            Some(FixtureFormat::Yaml) => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        };

        parsed.map_err(|e| TestError::SuiteParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
