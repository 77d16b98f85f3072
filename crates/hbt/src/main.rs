//! hbt - Hatena Blog bulk maintenance.
//!
//! Provides commands for:
//! - `login`: Verify the configured credential
//! - `replace-text`: Bulk-edit the body of every entry
//! - `dump-entries`: Export every entry to an interchange format
//! - `post-entry`: Post a new entry

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DumpEntriesArgs, LoginArgs, PostEntryArgs, ReplaceTextArgs};
use output::Output;

/// hbt - Hatena Blog bulk maintenance.
#[derive(Parser)]
#[command(name = "hbt", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the configured credential against the service root.
    Login(LoginArgs),
    /// Replace text in the body of every entry.
    ReplaceText(ReplaceTextArgs),
    /// Export every entry to an interchange format.
    DumpEntries(DumpEntriesArgs),
    /// Post a new entry into the collection.
    PostEntry(PostEntryArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // Log level comes from RUST_LOG; default is warnings only
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let result = match cli.command {
        Commands::Login(args) => args.execute(),
        Commands::ReplaceText(args) => args.execute(),
        Commands::DumpEntries(args) => args.execute(),
        Commands::PostEntry(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
