//! Check result reporting.

use std::fmt::Write as FmtWrite;
use std::io::{self, Write};

use crate::runner::{TestResult, TestResults};

/// Trait for reporting check results.
pub trait Reporter {
    /// Writes the results of a run to `out`.
    ///
    /// # Errors
    ///
    /// Returns an IO error if writing to output fails.
    fn write_report(&self, results: &TestResults, out: &mut dyn Write) -> io::Result<()>;

    /// Reports the results of a run on stdout.
    ///
    /// # Errors
    ///
    /// Returns an IO error if writing to stdout fails.
    fn report(&self, results: &TestResults) -> io::Result<()> {
        self.write_report(results, &mut io::stdout().lock())
    }
}

/// Console reporter with one line per check and a summary.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    use_colors: bool,
    verbose: bool,
}

impl ConsoleReporter {
    /// Creates a new console reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    /// Sets whether to use colors.
    #[must_use]
    pub const fn with_colors(mut self, colors: bool) -> Self {
        self.use_colors = colors;
        self
    }

    /// Sets verbose mode, which adds timings to every line.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("\x1b[{color}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn format_line(&self, mark: &str, result: &TestResult) -> String {
        if self.verbose {
            format!(
                "{} {} ({:.2}ms)",
                mark,
                result.name,
                result.duration.as_secs_f64() * 1000.0
            )
        } else {
            format!("{mark} {}", result.name)
        }
    }

    fn format_pass(&self, result: &TestResult) -> String {
        self.format_line(&self.paint("✓", "32"), result)
    }

    fn format_fail(&self, result: &TestResult) -> String {
        let mut line = self.format_line(&self.paint("✗", "31"), result);

        if let Some(error) = &result.error {
            let _ = write!(line, "\n    Error: {error}");
        }

        if let (Some(expected), Some(actual)) = (&result.expected, &result.actual) {
            let _ = write!(line, "\n    Expected: {expected}");
            let _ = write!(line, "\n    Actual: {actual}");
        }

        line
    }

    fn format_summary(&self, results: &TestResults) -> String {
        let status = if results.all_passed() {
            self.paint("PASSED", "32")
        } else {
            self.paint("FAILED", "31")
        };

        format!(
            "\n{}: {} passed, {} failed, {} total ({:.2}s)",
            status,
            results.passed(),
            results.failed(),
            results.total(),
            results.total_duration.as_secs_f64()
        )
    }
}

impl Reporter for ConsoleReporter {
    fn write_report(&self, results: &TestResults, out: &mut dyn Write) -> io::Result<()> {
        match &results.suite {
            Some(suite) => writeln!(out, "\nCheck Results: {suite}")?,
            None => writeln!(out, "\nCheck Results:")?,
        }
        writeln!(out, "{}", "─".repeat(50))?;

        for result in &results.results {
            if result.passed {
                writeln!(out, "{}", self.format_pass(result))?;
            } else {
                writeln!(out, "{}", self.format_fail(result))?;
            }
        }

        writeln!(out, "{}", "─".repeat(50))?;
        writeln!(out, "{}", self.format_summary(results))?;

        Ok(())
    }
}

/// JSON reporter that outputs results as a single document.
#[derive(Debug, Default)]
pub struct JsonReporter {
    pretty: bool,
}

impl JsonReporter {
    /// Creates a new JSON reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to pretty-print.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Reporter for JsonReporter {
    fn write_report(&self, results: &TestResults, out: &mut dyn Write) -> io::Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(results)
        } else {
            serde_json::to_string(results)
        }
        .map_err(io::Error::other)?;

        writeln!(out, "{json}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_results() -> TestResults {
        let mut results = TestResults::new();
        results.suite = Some("storage".to_string());
        results.add(TestResult::pass("account exists", Duration::from_millis(5)));
        results.add(TestResult::pass("tier is hot", Duration::from_millis(3)));
        results.add(
            TestResult::fail(
                "replication",
                Duration::from_millis(4),
                "azurerm_storage_account.this: attribute account_replication_type, planned value LRS not equal to assertion GRS",
            )
            .with_comparison("GRS", "LRS"),
        );
        results.total_duration = Duration::from_millis(12);
        results
    }

    fn render(reporter: &dyn Reporter, results: &TestResults) -> String {
        let mut out = Vec::new();
        reporter.write_report(results, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_console_reporter_format_pass() {
        let reporter = ConsoleReporter::new().with_colors(false);
        let result = TestResult::pass("my_check", Duration::from_millis(10));

        assert_eq!(reporter.format_pass(&result), "✓ my_check");

        let verbose = reporter.with_verbose(true).format_pass(&result);
        assert!(verbose.contains("(10.00ms)"));
    }

    #[test]
    fn test_console_reporter_format_fail() {
        let reporter = ConsoleReporter::new().with_colors(false);
        let result = TestResult::fail("my_check", Duration::from_millis(10), "error message")
            .with_comparison("true", "false");

        let formatted = reporter.format_fail(&result);
        assert!(formatted.contains("✗ my_check"));
        assert!(formatted.contains("Error: error message"));
        assert!(formatted.contains("Expected: true"));
        assert!(formatted.contains("Actual: false"));
    }

    #[test]
    fn test_console_reporter_colors() {
        let reporter = ConsoleReporter::new();
        let result = TestResult::pass("my_check", Duration::from_millis(10));
        assert!(reporter.format_pass(&result).contains("\x1b[32m"));
    }

    #[test]
    fn test_console_reporter_summary() {
        let reporter = ConsoleReporter::new().with_colors(false);
        let summary = reporter.format_summary(&sample_results());
        assert!(summary.contains("FAILED"));
        assert!(summary.contains("2 passed"));
        assert!(summary.contains("1 failed"));
        assert!(summary.contains("3 total"));

        let mut passing = TestResults::new();
        passing.add(TestResult::pass("only", Duration::from_millis(5)));
        assert!(reporter.format_summary(&passing).contains("PASSED"));
    }

    #[test]
    fn test_console_report_output() {
        let output = render(&ConsoleReporter::new().with_colors(false), &sample_results());
        assert!(output.contains("Check Results: storage"));
        assert!(output.contains("✓ account exists"));
        assert!(output.contains("Expected: GRS"));
    }

    #[test]
    fn test_json_reporter() {
        let output = render(&JsonReporter::new(), &sample_results());
        let doc: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(doc["suite"], "storage");
        assert_eq!(doc["results"].as_array().unwrap().len(), 3);
        assert_eq!(doc["results"][2]["actual"], "LRS");
        assert!(doc["results"][0].get("error").is_none());

        let pretty = render(&JsonReporter::new().with_pretty(true), &sample_results());
        assert!(pretty.contains("\n  \"results\""));
    }
}
