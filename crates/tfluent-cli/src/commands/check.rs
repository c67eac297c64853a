//! Check command implementation.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfluent_core::{OutputProvider, Outputs, Plan};
use tfluent_test::{
    CheckRunner, CheckSuite, ConsoleReporter, JsonReporter, Reporter, RunnerConfig,
    SuiteDiscovery, TestResults,
};

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Suite file, or a directory searched for `*.checks.{json,yaml,yml}`
    #[arg(default_value = "checks")]
    pub path: PathBuf,

    /// Plan JSON produced by `terraform show -json`
    #[arg(long, env = "TFLUENT_PLAN")]
    pub plan: PathBuf,

    /// Outputs JSON produced by `terraform output -json`; planned outputs are used otherwise
    #[arg(long)]
    pub outputs: Option<PathBuf>,

    /// Stop each suite at its first failing check
    #[arg(short, long)]
    pub fail_fast: bool,

    /// Output format; json prints one document per suite
    #[arg(long, default_value = "console")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show timings for every check
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format for the check command.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

/// Runs the check command.
pub fn run(args: &CheckArgs) -> Result<()> {
    let results = execute(args)?;

    let reporter: Box<dyn Reporter> = match args.format {
        OutputFormat::Console => Box::new(
            ConsoleReporter::new()
                .with_colors(!args.no_color)
                .with_verbose(args.verbose),
        ),
        OutputFormat::Json => Box::new(JsonReporter::new()),
    };
    for suite_results in &results {
        reporter.report(suite_results)?;
    }

    let failed: usize = results.iter().map(TestResults::failed).sum();
    if failed == 0 {
        Ok(())
    } else {
        anyhow::bail!("{failed} check(s) failed")
    }
}

/// Loads the plan, outputs and suites, and runs every suite.
fn execute(args: &CheckArgs) -> Result<Vec<TestResults>> {
    info!(plan = %args.plan.display(), path = %args.path.display(), "Running checks");

    let plan = Plan::from_file(&args.plan)?;
    let applied = args.outputs.as_ref().map(Outputs::from_file).transpose()?;
    let outputs: &dyn OutputProvider = match &applied {
        Some(applied) => applied,
        None => &plan,
    };

    let suites = load_suites(&args.path)?;
    if suites.is_empty() {
        anyhow::bail!("No check suites found in {}", args.path.display());
    }

    let runner = CheckRunner::new(RunnerConfig::new().with_fail_fast(args.fail_fast));
    let mut results = Vec::with_capacity(suites.len());
    for suite in &suites {
        results.push(runner.run_suite(suite, &plan, outputs)?);
    }
    Ok(results)
}

fn load_suites(path: &Path) -> Result<Vec<CheckSuite>> {
    if path.is_file() {
        return Ok(vec![CheckSuite::from_file(path)?]);
    }

    let found = SuiteDiscovery::new().discover(path)?;
    let mut suites = Vec::with_capacity(found.len());
    for discovered in found.suites() {
        suites.push(discovered.load()?);
    }
    Ok(suites)
}
