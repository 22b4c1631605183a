//! kiln CLI
//!
//! Resolves the effective build configuration for a project.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Control log verbosity (default: `kiln=info`)
//! - `KILN_HOME`: kiln install directory
//!
//! Logs go to stderr so JSON on stdout stays machine-readable.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use kiln_fs::NormalizedPath;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "kiln=debug" } else { "kiln=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose)
        .init();
    tracing::debug!("Verbose mode enabled");

    let cwd = NormalizedPath::current_dir()?;
    match cli.command {
        Commands::Resolve(args) => commands::run_resolve(cwd, args).await,
    }
}
