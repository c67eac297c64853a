//! Check runner.
//!
//! Evaluates declarative checks against a plan and its outputs through the
//! fluent assertions of `tfluent-core`, timing each one.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfluent_core::check::{in_plan, KeyCheck};
use tfluent_core::{AssertionError, Check, ErrorKind, OutputProvider, PlanProvider, ValueRef};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::fixtures::{CheckSpec, CheckSuite, Expectation};

/// Configuration for the check runner.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Whether to stop at the first failing check.
    pub fail_fast: bool,
}

impl RunnerConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets fail-fast mode.
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Result of a single check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Name of the check.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Duration of the check.
    pub duration: Duration,
    /// Error message if the check failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Expected value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl TestResult {
    /// Creates a passing result.
    #[must_use]
    pub fn pass(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: true,
            duration,
            error: None,
            expected: None,
            actual: None,
        }
    }

    /// Creates a failing result.
    #[must_use]
    pub fn fail(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            duration,
            error: Some(error.into()),
            expected: None,
            actual: None,
        }
    }

    /// Adds expected/actual values for mismatches.
    #[must_use]
    pub fn with_comparison(
        mut self,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

/// Aggregated results from running a suite.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TestResults {
    /// Name of the suite, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    /// Individual check results.
    pub results: Vec<TestResult>,
    /// Total duration of the run.
    pub total_duration: Duration,
}

impl TestResults {
    /// Creates a new empty results container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a result.
    pub fn add(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Returns the number of passed checks.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Returns the number of failed checks.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Returns the total number of checks run.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.results.len()
    }

    /// Returns true if every check passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Returns an iterator over failed checks.
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// A failed check before it is timed.
struct Failure {
    error: AssertionError,
    comparison: Option<(String, String)>,
}

impl From<AssertionError> for Failure {
    fn from(error: AssertionError) -> Self {
        Self {
            error,
            comparison: None,
        }
    }
}

type Outcome = std::result::Result<(), Failure>;

/// Runs checks against a plan and its outputs.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use tfluent_test::{CheckRunner, CheckSpec, Expectation, OutputsBuilder, PlanBuilder};
///
/// let plan = PlanBuilder::new()
///     .resource("local_file.test", json!({"content": "test"}))
///     .build();
/// let outputs = OutputsBuilder::new().build();
///
/// let check = CheckSpec::new("content")
///     .with_resource("local_file.test")
///     .with_key("content")
///     .expect(Expectation::Equals(json!("test")));
///
/// let result = CheckRunner::default().run_check(&check, &plan, &outputs);
/// assert!(result.passed);
/// ```
#[derive(Debug, Default)]
pub struct CheckRunner {
    config: RunnerConfig,
}

impl CheckRunner {
    /// Creates a new runner with the given configuration.
    #[must_use]
    pub const fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Runs a single check.
    ///
    /// An invalid check yields a failed result rather than an error.
    pub fn run_check(
        &self,
        check: &CheckSpec,
        plan: &dyn PlanProvider,
        outputs: &dyn OutputProvider,
    ) -> TestResult {
        let start = Instant::now();
        debug!(check = %check.name, "Running check");

        if let Err(e) = check.validate() {
            return TestResult::fail(&check.name, start.elapsed(), e.to_string());
        }

        let outcome = evaluate(check, plan, outputs);
        let duration = start.elapsed();

        match outcome {
            Ok(()) => {
                info!(check = %check.name, duration = ?duration, "Check passed");
                TestResult::pass(&check.name, duration)
            }
            Err(failure) => {
                info!(
                    check = %check.name,
                    kind = %failure.error.kind(),
                    duration = ?duration,
                    "Check failed"
                );
                let result = TestResult::fail(&check.name, duration, failure.error.to_string());
                match failure.comparison {
                    Some((expected, actual)) => result.with_comparison(expected, actual),
                    None => result,
                }
            }
        }
    }

    /// Runs every check in a suite.
    ///
    /// # Errors
    ///
    /// Returns an error before running anything if any check is invalid.
    pub fn run_suite(
        &self,
        suite: &CheckSuite,
        plan: &dyn PlanProvider,
        outputs: &dyn OutputProvider,
    ) -> Result<TestResults> {
        for check in &suite.checks {
            check.validate()?;
        }

        let start = Instant::now();
        let mut results = TestResults {
            suite: suite.name.clone(),
            ..TestResults::default()
        };

        for check in &suite.checks {
            let result = self.run_check(check, plan, outputs);
            let failed = !result.passed;
            results.add(result);

            if self.config.fail_fast && failed {
                warn!("Stopping early due to fail-fast mode");
                break;
            }
        }

        results.total_duration = start.elapsed();
        info!(
            passed = results.passed(),
            failed = results.failed(),
            "Suite complete"
        );
        Ok(results)
    }

    /// Returns the runner configuration.
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }
}

fn evaluate(check: &CheckSpec, plan: &dyn PlanProvider, outputs: &dyn OutputProvider) -> Outcome {
    if let Expectation::ResourceCount(n) = check.expect {
        return Ok(in_plan(plan).number_of_resources_equals(n)?);
    }

    if let Some(address) = &check.resource {
        let resource = in_plan(plan).that(address.as_str());
        let Some(key) = &check.key else {
            return match check.expect {
                Expectation::Exists => Ok(resource.exists()?),
                Expectation::DoesNotExist => Ok(resource.does_not_exist()?),
                _ => Err(unsupported(check)),
            };
        };
        let key = resource.key(key.as_str());
        return match &check.query {
            Some(query) => expect_value(&key.query(query), &check.expect),
            None => expect_key(&key, &check.expect),
        };
    }

    if let Some(name) = &check.output {
        let output = outputs.output_ref(name);
        let target = match &check.query {
            Some(query) => output.query(query),
            None => output,
        };
        return expect_value(&target, &check.expect);
    }

    Err(unsupported(check))
}

fn expect_key<P: PlanProvider + ?Sized>(key: &KeyCheck<'_, P>, expect: &Expectation) -> Outcome {
    match expect {
        Expectation::Exists => Ok(key.exists()?),
        Expectation::DoesNotExist => Ok(key.does_not_exist()?),
        Expectation::Equals(expected) => {
            with_comparison(key.has_value(expected), expected, &key.value_ref())
        }
        Expectation::Contains(substring) => Ok(key.contains_string(substring)?),
        Expectation::ResourceCount(_) => Ok(()),
    }
}

fn expect_value(target: &ValueRef, expect: &Expectation) -> Outcome {
    match expect {
        Expectation::Exists => Ok(target.exists()?),
        Expectation::DoesNotExist => Ok(target.does_not_exist()?),
        Expectation::Equals(expected) => {
            with_comparison(target.has_value(expected), expected, target)
        }
        Expectation::Contains(substring) => Ok(target.contains_string(substring)?),
        Expectation::ResourceCount(_) => Ok(()),
    }
}

/// Attaches expected and actual values to a mismatch.
fn with_comparison(check: Check, expected: &Value, actual: &ValueRef) -> Outcome {
    let Err(error) = check else {
        return Ok(());
    };
    let comparison = match (error.kind(), actual.get_value()) {
        (ErrorKind::AssertionMismatch, Ok(actual)) => Some((render(expected), render(actual))),
        _ => None,
    };
    Err(Failure { error, comparison })
}

fn unsupported(check: &CheckSpec) -> Failure {
    Failure::from(AssertionError::new(
        ErrorKind::InvalidComparison,
        format!("{}: unsupported target for {:?}", check.name, check.expect),
    ))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
