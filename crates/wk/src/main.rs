//! wk CLI - Revision-tracked wiki.
//!
//! Provides commands for:
//! - `show`: Render the latest revision of a page
//! - `save`: Save a new revision of a page
//! - `history`: List the revisions of a page
//! - `contributions`: List the pages an author has revised

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ContributionsArgs, GlobalArgs, HistoryArgs, SaveArgs, ShowArgs};
use output::Output;

/// wk - Revision-tracked wiki.
#[derive(Parser)]
#[command(name = "wk", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the latest revision of a page.
    Show(ShowArgs),
    /// Save a new revision of a page.
    Save(SaveArgs),
    /// List the revisions of a page, newest first.
    History(HistoryArgs),
    /// List the pages an author has revised.
    Contributions(ContributionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Show(args) => args.execute(&cli.global),
        Commands::Save(args) => args.execute(&cli.global),
        Commands::History(args) => args.execute(&cli.global),
        Commands::Contributions(args) => args.execute(&cli.global),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
