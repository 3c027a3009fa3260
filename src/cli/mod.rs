//! Command-line interface for webconf
//!
//! Provides `show`, `check`, `explain` and `completions` subcommands. Every
//! resolving command accepts the same source options and override flags.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod check;
mod completions;
mod explain;
mod show;
mod utils;

/// Resolve layered service configuration from defaults, files, dotenv, environment and flags
#[derive(Parser)]
#[command(name = "webconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging while resolving (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration
    Show(show::ShowArgs),

    /// Resolve the configuration and report whether it is usable
    Check(check::CheckArgs),

    /// Show which source supplied every configuration key
    Explain(explain::ExplainArgs),

    /// Print a shell completion script
    Completions(completions::CompletionsArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show(args) => show::run(args, cli.verbose),
        Commands::Check(args) => check::run(args, cli.verbose),
        Commands::Explain(args) => explain::run(args, cli.verbose),
        Commands::Completions(args) => completions::run(args),
    }
}
