//! Quire CLI - document library.
//!
//! Provides commands for:
//! - `list`: Print the document index
//! - `show`: Print one rendered document
//! - `watch`: Keep the index fresh, revalidating on changes and on a schedule

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{GlobalArgs, ListArgs, ShowArgs, WatchArgs};
use output::Output;

/// Quire - render a library of Markdown documents.
#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the document index.
    List(ListArgs),
    /// Print a rendered document.
    Show(ShowArgs),
    /// Print the index and refresh it when documents change.
    Watch(WatchArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::List(args) => args.execute(&cli.global),
        Commands::Show(args) => args.execute(&cli.global),
        Commands::Watch(args) => args.execute(&cli.global),
    };

    if let Err(err) = result {
        output.failure(&err);
        std::process::exit(1);
    }
}
