//! Test utilities for plan checks.
//!
//! Builders for in-memory plans and outputs, so checks can be exercised
//! without running Terraform, plus assertion helpers for check results.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use tfluent_core::{check::in_plan, Action, CheckExt};
//! use tfluent_test::PlanBuilder;
//!
//! let plan = PlanBuilder::new()
//!     .resource("module.storage.azurerm_storage_account.this", json!({
//!         "account_tier": "Standard",
//!     }))
//!     .change("module.storage.azurerm_storage_account.this", &[Action::Create])
//!     .build();
//!
//! let account = in_plan(&plan).that("module.storage.azurerm_storage_account.this");
//! account.key("account_tier").has_value("Standard").error_is_nil();
//! account.has_action(Action::Create).error_is_nil();
//! ```

use serde_json::{Map, Value};
use tfluent_core::{Action, Change, OutputValue, Outputs, Plan, PlannedResource, ResourceChange};

use crate::runner::{TestResult, TestResults};

/// The parts of a resource address.
struct AddressParts {
    module_address: Option<String>,
    mode: &'static str,
    resource_type: String,
    name: String,
    index: Option<Value>,
}

/// Splits `module.a.module.b.data.type.name[index]` into its parts.
fn parse_address(address: &str) -> AddressParts {
    let mut rest = address;
    let mut modules = Vec::new();
    while let Some(after) = rest.strip_prefix("module.") {
        let Some((module, remainder)) = after.split_once('.') else {
            break;
        };
        modules.push(format!("module.{module}"));
        rest = remainder;
    }

    let (mode, rest) = match rest.strip_prefix("data.") {
        Some(after) => ("data", after),
        None => ("managed", rest),
    };

    let (resource_type, name) = rest.split_once('.').unwrap_or((rest, ""));
    let (name, index) = match name.split_once('[') {
        Some((name, index)) => {
            let index = index.trim_end_matches(']');
            let index = serde_json::from_str(index).unwrap_or_else(|_| Value::from(index));
            (name, Some(index))
        }
        None => (name, None),
    };

    AddressParts {
        module_address: (!modules.is_empty()).then(|| modules.join(".")),
        mode,
        resource_type: resource_type.to_string(),
        name: name.to_string(),
        index,
    }
}

fn provider_for(resource_type: &str) -> String {
    let provider = resource_type.split('_').next().unwrap_or(resource_type);
    format!("registry.terraform.io/hashicorp/{provider}")
}

/// Fluent builder for in-memory plans.
///
/// Resource type, name, mode and index are derived from each address.
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    resources: Vec<PlannedResource>,
    changes: Vec<ResourceChange>,
    outputs: Vec<(String, Value)>,
}

impl PlanBuilder {
    /// Creates an empty plan builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a planned resource. Non-object `values` yield no attributes.
    #[must_use]
    pub fn resource(mut self, address: impl Into<String>, values: Value) -> Self {
        let address = address.into();
        let parts = parse_address(&address);
        let values = match values {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.resources.push(PlannedResource {
            provider_name: provider_for(&parts.resource_type),
            mode: parts.mode.to_string(),
            resource_type: parts.resource_type,
            name: parts.name,
            index: parts.index,
            address,
            values,
        });
        self
    }

    /// Records the planned actions for a resource.
    #[must_use]
    pub fn change(mut self, address: impl Into<String>, actions: &[Action]) -> Self {
        let address = address.into();
        let parts = parse_address(&address);
        let after = self
            .resources
            .iter()
            .find(|r| r.address == address)
            .map_or(Value::Null, |r| Value::Object(r.values.clone()));
        self.changes.push(ResourceChange {
            provider_name: provider_for(&parts.resource_type),
            module_address: parts.module_address,
            mode: parts.mode.to_string(),
            resource_type: parts.resource_type,
            name: parts.name,
            address,
            change: Change {
                actions: actions.to_vec(),
                before: Value::Null,
                after,
                after_unknown: Value::Object(Map::new()),
            },
        });
        self
    }

    /// Adds a planned output value.
    #[must_use]
    pub fn output(mut self, name: impl Into<String>, value: Value) -> Self {
        self.outputs.push((name.into(), value));
        self
    }

    /// Builds the plan.
    #[must_use]
    pub fn build(self) -> Plan {
        let plan = self
            .changes
            .into_iter()
            .fold(Plan::from_resources(self.resources), Plan::with_change);
        self.outputs
            .into_iter()
            .fold(plan, |plan, (name, value)| plan.with_output(name, value))
    }
}

/// Fluent builder for applied outputs.
#[derive(Debug, Clone, Default)]
pub struct OutputsBuilder {
    outputs: Outputs,
}

impl OutputsBuilder {
    /// Creates an empty outputs builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a non-sensitive output.
    #[must_use]
    pub fn output(mut self, name: impl Into<String>, value: Value) -> Self {
        self.outputs = self.outputs.with_output(name, OutputValue::new(value));
        self
    }

    /// Adds a sensitive output.
    #[must_use]
    pub fn sensitive_output(mut self, name: impl Into<String>, value: Value) -> Self {
        let mut output = OutputValue::new(value);
        output.sensitive = true;
        self.outputs = self.outputs.with_output(name, output);
        self
    }

    /// Builds the outputs.
    #[must_use]
    pub fn build(self) -> Outputs {
        self.outputs
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Asserts that every check in a run passed.
///
/// # Panics
///
/// Panics listing each failure if any check failed.
#[track_caller]
pub fn assert_all_passed(results: &TestResults) {
    let failures: Vec<String> = results
        .failures()
        .map(|r| format!("  {}: {}", r.name, r.error.as_deref().unwrap_or("failed")))
        .collect();
    assert!(
        failures.is_empty(),
        "{} of {} checks failed:\n{}",
        failures.len(),
        results.total(),
        failures.join("\n")
    );
}

/// Asserts that a single check passed.
///
/// # Panics
///
/// Panics with the check's error if it failed.
#[track_caller]
pub fn assert_check_passed(result: &TestResult) {
    assert!(
        result.passed,
        "Expected check '{}' to pass, but it failed: {}",
        result.name,
        result.error.as_deref().unwrap_or("no error recorded")
    );
}

/// Asserts that a single check failed with an error containing `contains`.
///
/// # Panics
///
/// Panics if the check passed or failed with a different error.
#[track_caller]
pub fn assert_check_failed(result: &TestResult, contains: &str) {
    assert!(
        !result.passed,
        "Expected check '{}' to fail, but it passed",
        result.name
    );
    let error = result.error.as_deref().unwrap_or_default();
    assert!(
        error.contains(contains),
        "Check '{}' failed with '{error}', which does not contain '{contains}'",
        result.name
    );
}
