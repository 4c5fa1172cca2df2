//! bibdedup - duplicate report and removal for bibliographic CSV exports
//!
//! ## Usage
//!
//! ### Report duplicates by DOI and title
//! ```bash
//! bibdedup report export.csv --output-dir ./output
//! ```
//!
//! ### Remove duplicates by title
//! ```bash
//! bibdedup remove export.csv --output-file cleaned.csv
//! ```

use anyhow::{Context, Result};
use bibdedup::{config::RunConfig, remove, report};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Duplicate report and removal for bibliographic CSV exports
#[derive(Parser)]
#[command(name = "bibdedup")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report duplicates by DOI and by title, saving a transcript
    Report(RunArgs),

    /// Remove duplicates by title, keeping the first occurrence
    Remove(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// CSV export to read
    input: PathBuf,

    /// Directory for timestamped output files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Write to this file instead of a timestamped name
    #[arg(long)]
    output_file: Option<PathBuf>,
}

impl RunArgs {
    fn into_config(self) -> RunConfig {
        RunConfig {
            input: self.input,
            output_dir: self.output_dir,
            output_file: self.output_file,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the report itself
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Report(args) => {
            let config = args.into_config();
            let summary = report::run(&config).context("Duplicate report failed")?;
            debug!(?summary, "Report finished");
        }
        Commands::Remove(args) => {
            let config = args.into_config();
            let summary = remove::run(&config).context("Duplicate removal failed")?;
            debug!(?summary, "Removal finished");
        }
    }

    Ok(())
}
