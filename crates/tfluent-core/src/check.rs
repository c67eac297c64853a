//! Fluent assertions over a plan.
//!
//! [`in_plan`] is the entry point:
//!
//! ```rust
//! use serde_json::json;
//! use tfluent_core::{check::in_plan, CheckExt, Plan, PlannedResource};
//!
//! let plan = Plan::from_resources([PlannedResource {
//!     address: "local_file.test".into(),
//!     mode: "managed".into(),
//!     resource_type: "local_file".into(),
//!     name: "test".into(),
//!     index: None,
//!     provider_name: String::new(),
//!     values: json!({"content": "test"}).as_object().cloned().unwrap(),
//! }]);
//!
//! in_plan(&plan).number_of_resources_equals(1).error_is_nil();
//! in_plan(&plan).that("local_file.test").key("content").has_value("test").error_is_nil();
//! in_plan(&plan)
//!     .that("local_file.test")
//!     .key("content")
//!     .has_value("throwError")
//!     .error_contains("attribute content, planned value test not equal to assertion throwError");
//! ```

use serde_json::{Map, Value};

use crate::assertion::{AssertionError, Check, ErrorKind};
use crate::operative::{check_json_text, compare, JsonFailure, ValueRef};
use crate::plan::Action;
use crate::provider::PlanProvider;
use crate::value::{Expected, Rendered};

/// Starts a chain of assertions against `plan`.
#[must_use]
pub const fn in_plan<P: PlanProvider + ?Sized>(plan: &P) -> PlanCheck<'_, P> {
    PlanCheck { plan }
}

/// Assertions about the plan as a whole.
#[derive(Debug)]
pub struct PlanCheck<'a, P: ?Sized> {
    plan: &'a P,
}

impl<'a, P: PlanProvider + ?Sized> PlanCheck<'a, P> {
    /// Fails unless the plan contains exactly `expected` resources.
    ///
    /// # Errors
    ///
    /// Returns a mismatch error with both counts.
    pub fn number_of_resources_equals(&self, expected: usize) -> Check {
        let actual = self.plan.resource_count();
        if actual != expected {
            return Err(AssertionError::new(
                ErrorKind::AssertionMismatch,
                format!("expected {expected} resources, got {actual}"),
            ));
        }
        Ok(())
    }

    /// Narrows the chain to the resource at `address`.
    #[must_use]
    pub fn that(&self, address: impl Into<String>) -> ResourceCheck<'a, P> {
        ResourceCheck {
            plan: self.plan,
            address: address.into(),
        }
    }
}

/// Assertions about a single resource.
#[derive(Debug)]
pub struct ResourceCheck<'a, P: ?Sized> {
    plan: &'a P,
    address: String,
}

impl<'a, P: PlanProvider + ?Sized> ResourceCheck<'a, P> {
    fn attributes(&self) -> Result<&'a Map<String, Value>, AssertionError> {
        self.plan.resource(&self.address).ok_or_else(|| {
            AssertionError::new(
                ErrorKind::NotFound,
                format!("{}: resource not found in plan", self.address),
            )
        })
    }

    /// Returns the resource address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Fails unless the resource is in the plan.
    ///
    /// # Errors
    ///
    /// Returns a not-found error.
    pub fn exists(&self) -> Check {
        self.attributes().map(|_| ())
    }

    /// Fails if the resource is in the plan.
    ///
    /// # Errors
    ///
    /// Returns a found-when-not-expected error.
    pub fn does_not_exist(&self) -> Check {
        if self.plan.resource(&self.address).is_some() {
            return Err(AssertionError::new(
                ErrorKind::FoundWhenNotExpected,
                format!("{}: resource found in plan", self.address),
            ));
        }
        Ok(())
    }

    /// Returns the planned change actions for the resource, if the plan
    /// records any.
    #[must_use]
    pub fn change_actions(&self) -> Option<&'a [Action]> {
        self.plan.change_actions(&self.address)
    }

    /// Fails unless the planned change for the resource includes `action`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the plan records no change for the
    /// resource, or a mismatch error listing the planned actions.
    pub fn has_action(&self, action: Action) -> Check {
        let Some(actions) = self.change_actions() else {
            return Err(AssertionError::new(
                ErrorKind::NotFound,
                format!("{}: resource change not found in plan", self.address),
            ));
        };
        if !actions.contains(&action) {
            return Err(AssertionError::new(
                ErrorKind::AssertionMismatch,
                format!(
                    "{}: planned actions {actions:?} do not include {action:?}",
                    self.address
                ),
            ));
        }
        Ok(())
    }

    /// Narrows the chain to attribute `key` of the resource.
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> KeyCheck<'a, P> {
        KeyCheck {
            resource: ResourceCheck {
                plan: self.plan,
                address: self.address.clone(),
            },
            key: key.into(),
        }
    }
}

/// Assertions about one attribute of a resource.
#[derive(Debug)]
pub struct KeyCheck<'a, P: ?Sized> {
    resource: ResourceCheck<'a, P>,
    key: String,
}

impl<'a, P: PlanProvider + ?Sized> KeyCheck<'a, P> {
    fn address(&self) -> &str {
        &self.resource.address
    }

    fn actual(&self) -> Result<&'a Value, AssertionError> {
        let attributes = self.resource.attributes()?;
        attributes.get(&self.key).ok_or_else(|| {
            AssertionError::new(
                ErrorKind::NotFound,
                format!("{}: key {} not found in resource", self.address(), self.key),
            )
        })
    }

    /// Fails unless the resource exists and has the attribute.
    ///
    /// # Errors
    ///
    /// Returns a not-found error naming the resource or the key.
    pub fn exists(&self) -> Check {
        self.actual().map(|_| ())
    }

    /// Fails unless the resource exists without the attribute.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for a missing resource, or a
    /// found-when-not-expected error.
    pub fn does_not_exist(&self) -> Check {
        let attributes = self.resource.attributes()?;
        if attributes.contains_key(&self.key) {
            return Err(AssertionError::new(
                ErrorKind::FoundWhenNotExpected,
                format!("{}: key {} found in resource", self.address(), self.key),
            ));
        }
        Ok(())
    }

    /// Fails unless the planned attribute value equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error, an invalid-comparison error for function
    /// values, or a mismatch error.
    pub fn has_value(&self, expected: impl Into<Expected>) -> Check {
        let actual = self.actual()?;
        let (expected, equal) = compare(expected.into(), actual)?;
        if !equal {
            return Err(AssertionError::new(
                ErrorKind::AssertionMismatch,
                format!(
                    "{}: attribute {}, planned value {} not equal to assertion {}",
                    self.address(),
                    self.key,
                    Rendered(actual),
                    Rendered(&expected)
                ),
            ));
        }
        Ok(())
    }

    /// Fails unless the planned attribute is a string containing `expected`.
    ///
    /// # Errors
    ///
    /// See [`ValueRef::contains_string`].
    pub fn contains_string(&self, expected: &str) -> Check {
        self.actual()?;
        self.value_ref().contains_string(expected)
    }

    /// Runs `assertion` over the raw JSON text of the attribute.
    ///
    /// # Errors
    ///
    /// Returns a not-found error, an error when the attribute is empty or not
    /// a string, or a predicate failure.
    pub fn contains_json_value<F, E>(&self, assertion: F) -> Check
    where
        F: FnOnce(&[u8]) -> Result<Option<bool>, E>,
        E: std::fmt::Display,
    {
        let actual = self.actual()?;
        let (address, key) = (self.address(), &self.key);
        check_json_text(actual, assertion, |failure| match failure {
            JsonFailure::Empty => format!("{address}: key {key} was empty"),
            JsonFailure::NotString => format!("{address}: key {key} is not a string"),
            JsonFailure::Errored { error, .. } => {
                format!("{address}: asserting value for {key:?}: {error}")
            }
            JsonFailure::Rejected { .. } => format!("{address}: assertion failed for {key:?}"),
        })
    }

    /// Returns a reference to the attribute value, named
    /// `"<address>.<key>"`.
    #[must_use]
    pub fn value_ref(&self) -> ValueRef {
        self.plan().attribute(self.address(), &self.key)
    }

    /// Evaluates `path` against the attribute value.
    ///
    /// See [`ValueRef::query`].
    #[must_use]
    pub fn query(&self, path: &str) -> ValueRef {
        self.value_ref().query(path)
    }

    fn plan(&self) -> &'a P {
        self.resource.plan
    }
}
