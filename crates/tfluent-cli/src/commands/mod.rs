//! CLI commands and argument parsing.

pub mod check;
pub mod get;

use clap::{Parser, Subcommand};

/// tfluent - fluent assertions over Terraform plans
#[derive(Parser)]
#[command(name = "tfluent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run check suites against a plan
    Check(check::CheckArgs),

    /// Print a planned resource, attribute or query result
    Get(get::GetArgs),

    /// Print version information
    Version,
}
