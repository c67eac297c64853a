//! # tfluent Core
//!
//! Fluent assertions over Terraform plan and output values.
//!
//! This crate provides:
//!
//! - [`ValueRef`] - a located (or missing) value plus the path describing it,
//!   with the assertion methods `exists`, `does_not_exist`, `has_value`,
//!   `contains_string`, `contains_json_value` and `get_value`
//! - [`query`] - the dot-path query language used by [`ValueRef::query`]
//! - [`AssertionError`] and [`CheckExt`] - assertion outcomes and their
//!   test-framework integration
//! - [`Plan`] and [`Outputs`] - parsers for `terraform show -json` and
//!   `terraform output -json`
//! - [`check`] - resource/attribute assertions starting from [`check::in_plan`]
//!
//! ## Example
//!
//! ```rust
//! use tfluent_core::{check::in_plan, CheckExt, Plan};
//!
//! let plan = Plan::from_json_str(r#"{
//!     "format_version": "1.2",
//!     "planned_values": {"root_module": {"resources": [{
//!         "address": "azapi_resource.test",
//!         "values": {"body": "{\"properties\":{\"sku\":{\"name\":\"Standard\"}}}"}
//!     }]}}
//! }"#)?;
//!
//! in_plan(&plan)
//!     .that("azapi_resource.test")
//!     .key("body")
//!     .query("properties.sku.name")
//!     .has_value("Standard")
//!     .error_is_nil();
//! # Ok::<(), tfluent_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assertion;
pub mod check;
pub mod error;
pub mod operative;
pub mod output;
pub mod plan;
pub mod provider;
pub mod query;
pub mod value;


pub use assertion::{AssertionError, Check, CheckExt, ErrorKind};
pub use error::{Error, Result};
pub use operative::ValueRef;
pub use output::{OutputValue, Outputs};
pub use plan::{Action, Change, Plan, PlannedResource, ResourceChange};
pub use provider::{OutputProvider, PlanProvider};
pub use value::{values_equal, Expected};
