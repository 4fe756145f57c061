//! Folio CLI - versioned documentation corpus.
//!
//! Provides commands for:
//! - `index`: Synchronize the search index
//! - `versions`: List documentation versions
//! - `docs`: List the documents of a version
//! - `resolve`: Classify a path within a version
//! - `watch`: Keep the corpus cache warm while files change

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DocsArgs, IndexArgs, ResolveArgs, VersionsArgs, WatchArgs};
use output::Output;

/// Folio - versioned documentation corpus.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk every version and synchronize the search index.
    Index(IndexArgs),
    /// List documentation versions.
    Versions(VersionsArgs),
    /// List the documents of a version in navigation order.
    Docs(DocsArgs),
    /// Classify a path as a document, category or not found.
    Resolve(ResolveArgs),
    /// Watch the docs directory and reload changed versions.
    Watch(WatchArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Index(args) => args.execute(),
        Commands::Versions(args) => args.execute(),
        Commands::Docs(args) => args.execute(),
        Commands::Resolve(args) => args.execute(),
        Commands::Watch(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// `--verbose` enables INFO level, otherwise use `RUST_LOG` or default to WARN.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("info");
    }
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}
