//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use kiln_config::{Command, Mode};
use std::path::PathBuf;

/// kiln - resolve build configuration
#[derive(Parser, Debug)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve the effective configuration and print it as JSON
    ///
    /// Examples:
    ///   kiln resolve                               # Search the current directory
    ///   kiln resolve --config /abs/kiln.config.ts  # Explicit config file
    ///   kiln resolve --mode production --command build --out resolved.json
    Resolve(ResolveArgs),
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct ResolveArgs {
    /// Absolute path to a config file or a directory containing one
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Compilation mode (development or production)
    #[arg(short, long)]
    pub mode: Option<Mode>,

    /// Command the configuration is resolved for (serve or build)
    #[arg(long, default_value_t = Command::Build)]
    pub command: Command,

    /// Clear the terminal before resolving
    #[arg(long)]
    pub clear_screen: bool,

    /// Project root, relative to the current directory
    #[arg(long)]
    pub root: Option<String>,

    /// kiln install directory holding the engine library and runtime
    #[arg(long, env = "KILN_HOME")]
    pub runtime_dir: Option<PathBuf>,

    /// Engine executable used to compile config files that need it
    #[arg(long, env = "KILN_ENGINE")]
    pub engine: Option<PathBuf>,

    /// Script runtime used to import script config files
    #[arg(long, env = "KILN_SCRIPT_RUNTIME")]
    pub script_runtime: Option<PathBuf>,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Resolve as part of a dev server restart
    #[arg(long)]
    pub restarting: bool,
}
