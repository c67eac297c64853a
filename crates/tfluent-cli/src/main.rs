//! tfluent CLI - run fluent checks against saved Terraform plans.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tfluent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => commands::check::run(&args),
        Commands::Get(args) => commands::get::run(&args),
        Commands::Version => {
            println!("tfluent {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
