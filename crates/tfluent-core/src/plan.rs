//! Terraform plan documents.
//!
//! A [`Plan`] is built from the JSON produced by
//! `terraform show -json <planfile>`. Resources from the root module and every
//! nested child module are flattened into a single map keyed by address
//! (e.g. `module.storage.azurerm_storage_account.this`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::provider::{OutputProvider, PlanProvider};

/// Plan format major version this crate understands.
const SUPPORTED_FORMAT_MAJOR: &str = "1";

/// A planned change action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// No change.
    NoOp,
    /// The resource will be created.
    Create,
    /// A data source will be read.
    Read,
    /// The resource will be updated in place.
    Update,
    /// The resource will be destroyed.
    Delete,
    /// The resource will be removed from state without being destroyed.
    Forget,
    /// An action this crate does not recognise.
    #[serde(other)]
    Unknown,
}

/// A resource as it appears in the planned values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedResource {
    /// Absolute resource address.
    pub address: String,
    /// `managed` or `data`.
    #[serde(default)]
    pub mode: String,
    /// Resource type, e.g. `local_file`.
    #[serde(rename = "type", default)]
    pub resource_type: String,
    /// Resource name within its module.
    #[serde(default)]
    pub name: String,
    /// `count` or `for_each` key, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Value>,
    /// Provider that manages the resource.
    #[serde(default)]
    pub provider_name: String,
    /// Planned attribute values.
    #[serde(default)]
    pub values: Map<String, Value>,
}

/// The before/after states of a planned change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Actions Terraform will take.
    pub actions: Vec<Action>,
    /// State before the change; `null` on create.
    #[serde(default)]
    pub before: Value,
    /// State after the change; `null` on delete.
    #[serde(default)]
    pub after: Value,
    /// Attributes whose values are only known after apply.
    #[serde(default)]
    pub after_unknown: Value,
}

/// A single entry of the plan's `resource_changes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Absolute resource address.
    pub address: String,
    /// Address of the containing module, absent for the root module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_address: Option<String>,
    /// `managed` or `data`.
    #[serde(default)]
    pub mode: String,
    /// Resource type.
    #[serde(rename = "type", default)]
    pub resource_type: String,
    /// Resource name within its module.
    #[serde(default)]
    pub name: String,
    /// Provider that manages the resource.
    #[serde(default)]
    pub provider_name: String,
    /// The planned change.
    pub change: Change,
}

#[derive(Debug, Deserialize)]
struct PlanDocument {
    format_version: String,
    #[serde(default)]
    terraform_version: String,
    #[serde(default)]
    planned_values: PlannedValues,
    #[serde(default)]
    resource_changes: Vec<ResourceChange>,
}

#[derive(Debug, Default, Deserialize)]
struct PlannedValues {
    #[serde(default)]
    outputs: BTreeMap<String, PlannedOutput>,
    #[serde(default)]
    root_module: Module,
}

#[derive(Debug, Deserialize)]
struct PlannedOutput {
    /// `None` when the key is absent. An explicit `null` is `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present")]
    value: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
struct Module {
    #[serde(default)]
    resources: Vec<PlannedResource>,
    #[serde(default)]
    child_modules: Vec<Module>,
}

impl Module {
    fn collect_into(self, resources: &mut BTreeMap<String, PlannedResource>) {
        for resource in self.resources {
            resources.insert(resource.address.clone(), resource);
        }
        for child in self.child_modules {
            child.collect_into(resources);
        }
    }
}

/// A parsed Terraform plan.
///
/// # Examples
///
/// ```rust
/// use tfluent_core::{Plan, PlanProvider};
///
/// let plan = Plan::from_json_str(r#"{
///     "format_version": "1.2",
///     "planned_values": {
///         "root_module": {
///             "resources": [
///                 {"address": "local_file.test", "values": {"content": "test"}}
///             ]
///         }
///     }
/// }"#)?;
///
/// assert_eq!(plan.resource_count(), 1);
/// assert!(plan.resource("local_file.test").is_some());
/// # Ok::<(), tfluent_core::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    format_version: String,
    terraform_version: String,
    resources: BTreeMap<String, PlannedResource>,
    changes: BTreeMap<String, ResourceChange>,
    outputs: Map<String, Value>,
}

impl Plan {
    /// Parses a plan from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a plan document or its format
    /// version is unsupported.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_slice(json.as_bytes())
    }

    /// Parses a plan from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a plan document or its format
    /// version is unsupported.
    pub fn from_json_slice(json: &[u8]) -> Result<Self> {
        let document: PlanDocument = serde_json::from_slice(json).map_err(|source| Error::Json {
            document: "plan",
            source,
        })?;
        Self::from_document(document)
    }

    /// Reads and parses a plan file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "Loading plan");
        Self::from_json_slice(&content)
    }

    fn from_document(document: PlanDocument) -> Result<Self> {
        let major = document.format_version.split('.').next().unwrap_or_default();
        if major != SUPPORTED_FORMAT_MAJOR {
            return Err(Error::InvalidDocument {
                document: "plan",
                reason: format!("unsupported format_version {}", document.format_version),
            });
        }

        let mut resources = BTreeMap::new();
        document.planned_values.root_module.collect_into(&mut resources);

        let changes = document
            .resource_changes
            .into_iter()
            .map(|change| (change.address.clone(), change))
            .collect();

        // Outputs that are unknown until apply carry no value.
        let outputs = document
            .planned_values
            .outputs
            .into_iter()
            .filter_map(|(name, output)| output.value.map(|value| (name, value)))
            .collect();

        debug!(
            resources = resources.len(),
            format_version = %document.format_version,
            "Parsed plan"
        );

        Ok(Self {
            format_version: document.format_version,
            terraform_version: document.terraform_version,
            resources,
            changes,
            outputs,
        })
    }

    /// Creates a plan directly from planned resources.
    #[must_use]
    pub fn from_resources(resources: impl IntoIterator<Item = PlannedResource>) -> Self {
        Self {
            format_version: "1.2".to_string(),
            resources: resources
                .into_iter()
                .map(|r| (r.address.clone(), r))
                .collect(),
            ..Self::default()
        }
    }

    /// Adds a resource change.
    #[must_use]
    pub fn with_change(mut self, change: ResourceChange) -> Self {
        self.changes.insert(change.address.clone(), change);
        self
    }

    /// Adds a planned output value.
    #[must_use]
    pub fn with_output(mut self, name: impl Into<String>, value: Value) -> Self {
        self.outputs.insert(name.into(), value);
        self
    }

    /// Returns the plan format version.
    #[must_use]
    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    /// Returns the Terraform version that produced the plan.
    #[must_use]
    pub fn terraform_version(&self) -> &str {
        &self.terraform_version
    }

    /// Returns the planned resources keyed by address.
    #[must_use]
    pub const fn resources(&self) -> &BTreeMap<String, PlannedResource> {
        &self.resources
    }

    /// Returns the resource change for `address`.
    #[must_use]
    pub fn resource_change(&self, address: &str) -> Option<&ResourceChange> {
        self.changes.get(address)
    }

    /// Returns all resource changes keyed by address.
    #[must_use]
    pub const fn resource_changes(&self) -> &BTreeMap<String, ResourceChange> {
        &self.changes
    }
}

impl PlanProvider for Plan {
    fn resource(&self, address: &str) -> Option<&Map<String, Value>> {
        self.resources.get(address).map(|r| &r.values)
    }

    fn resource_count(&self) -> usize {
        self.resources.len()
    }

    fn change_actions(&self, address: &str) -> Option<&[Action]> {
        self.changes.get(address).map(|c| c.change.actions.as_slice())
    }
}

impl OutputProvider for Plan {
    fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }
}
