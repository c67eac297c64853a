//! # tfluent Test
//!
//! Declarative check suites for Terraform plans.
//!
//! This crate provides functionality for:
//!
//! - Describing checks in JSON or YAML suite files
//! - Discovering suite files in a directory tree
//! - Running suites against a plan and its outputs
//! - Reporting results on the console or as JSON
//! - Building in-memory plans and outputs for tests
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use tfluent_test::{assert_all_passed, CheckRunner, CheckSuite, OutputsBuilder, PlanBuilder, RunnerConfig};
//!
//! let suite = CheckSuite::from_yaml_str(r"
//! name: files
//! checks:
//!   - name: one resource
//!     expect: { resource_count: 1 }
//!   - name: content
//!     resource: local_file.test
//!     key: content
//!     expect: { contains: hello }
//! ")?;
//!
//! let plan = PlanBuilder::new()
//!     .resource("local_file.test", json!({"content": "hello world"}))
//!     .build();
//! let outputs = OutputsBuilder::new().build();
//!
//! let runner = CheckRunner::new(RunnerConfig::default());
//! let results = runner.run_suite(&suite, &plan, &outputs)?;
//! assert_all_passed(&results);
//! # Ok::<(), tfluent_test::TestError>(())
//! ```

pub mod discovery;
pub mod error;
pub mod fixtures;
pub mod reporter;
pub mod runner;
pub mod test_utils;

pub use discovery::{DiscoveredSuite, DiscoveredSuites, DiscoveryConfig, FixtureFormat, SuiteDiscovery};
pub use error::{Result, TestError};
pub use fixtures::{CheckSpec, CheckSuite, Expectation};
pub use reporter::{ConsoleReporter, JsonReporter, Reporter};
pub use runner::{CheckRunner, RunnerConfig, TestResult, TestResults};
pub use test_utils::{
    assert_all_passed, assert_check_failed, assert_check_passed, OutputsBuilder, PlanBuilder,
};
