//! CLI subcommand definitions and handlers.
//!
//! - `mailsweep scan <workers>` - Run a scan with a fixed worker count
//! - `mailsweep export` - Regenerate or export results from the raw log

mod export;
mod scan;

pub use export::ExportCommand;
pub use scan::ScanCommand;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mailsweep - a concurrent SMTP credential auditing scanner.
///
/// Probes hosts for live SMTP submission services, verifies credential
/// pairs against them, and records verified successes durably. For use
/// in authorized security assessments only.
#[derive(Parser, Debug)]
#[command(name = "mailsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent SMTP credential auditing scanner", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug-level logging and a progress bar over the task set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only errors and the results themselves
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe hosts and verify credential pairs against them
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Rebuild the report or export the raw log in another format
    #[command(alias = "e")]
    Export(ExportCommand),
}

/// Export format for the raw result log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// The numbered-block report
    #[default]
    Plain,
    /// JSON array of records
    Json,
    /// CSV with a header row
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Plain => "plain",
            Self::Json => "json",
            Self::Csv => "csv",
        };
        f.write_str(name)
    }
}
