//! hdiff CLI - visual HTML diff.
//!
//! Provides commands for:
//! - `diff`: Diff two HTML files
//! - `request`: Answer a JSON diff request
//! - `engines`: List available diff engines
//! - `lists`: Annotate ordered lists in existing diff output

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DiffArgs, EnginesArgs, ListsArgs, RequestArgs};
use output::Output;

/// hdiff - Visual HTML diff.
#[derive(Parser)]
#[command(name = "hdiff", version, about)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two HTML files.
    Diff(DiffArgs),
    /// Read a JSON diff request and print the JSON response.
    Request(RequestArgs),
    /// List available diff engines.
    Engines(EnginesArgs),
    /// Apply list classes to diff HTML.
    Lists(ListsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Diff(args) => args.execute(),
        Commands::Request(args) => args.execute(),
        Commands::Engines(args) => args.execute(),
        Commands::Lists(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
