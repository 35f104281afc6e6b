//! Export subcommand implementation.
//!
//! Exports always re-read the entire raw log and rebuild their output
//! from scratch, so running them repeatedly is safe and, for unchanged
//! logs, byte-identical.

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::{RawRecord, ResultStore};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Regenerate or export results from the raw log.
#[derive(Parser, Debug)]
pub struct ExportCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Raw result log to read
    #[arg(long, default_value = "found_servers.txt")]
    pub raw_log: PathBuf,

    /// Report file regenerated by the plain format
    #[arg(long, default_value = "found_servers_report.txt")]
    pub report: PathBuf,

    /// Output file path (json/csv print to stdout if not specified)
    #[arg(short = 'o', long = "output")]
    pub output_file: Option<PathBuf>,
}

impl ExportCommand {
    /// Execute the export command.
    pub fn execute(&self, quiet: bool) -> CliResult<()> {
        let store = ResultStore::new(self.raw_log.clone(), self.report.clone());

        match self.format {
            OutputFormat::Plain => {
                let target = self.output_file.as_ref().unwrap_or(&self.report);
                let text = store.report_text()?;
                let count = store.read_raw()?.len();
                fs::write(target, text)
                    .map_err(|e| CliError::Other(format!("failed to write report: {e}")))?;

                if !quiet {
                    output::print_success(&format!(
                        "report regenerated with {} server{} at {}",
                        count,
                        if count == 1 { "" } else { "s" },
                        target.display()
                    ));
                }
            }
            OutputFormat::Json => {
                let records = store.read_raw()?;
                let content = serde_json::to_string_pretty(&records)
                    .map_err(|e| CliError::Other(e.to_string()))?;
                self.emit(content, quiet)?;
            }
            OutputFormat::Csv => {
                let records = store.read_raw()?;
                self.emit(generate_csv(&records)?, quiet)?;
            }
        }

        Ok(())
    }

    fn emit(&self, content: String, quiet: bool) -> CliResult<()> {
        match &self.output_file {
            Some(path) => {
                fs::write(path, content)
                    .map_err(|e| CliError::Other(format!("failed to write file: {e}")))?;
                if !quiet {
                    output::print_success(&format!(
                        "exported {} results to {}",
                        self.format,
                        path.display()
                    ));
                }
            }
            None => println!("{content}"),
        }
        Ok(())
    }
}

/// Generate CSV output.
fn generate_csv(records: &[RawRecord]) -> CliResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["host", "username", "password", "domain", "timestamp"])
        .map_err(|e| CliError::Other(e.to_string()))?;

    for record in records {
        wtr.write_record([
            record.host.as_str(),
            record.username.as_str(),
            record.password.as_str(),
            record.domain.as_str(),
            &record
                .timestamp
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        ])
        .map_err(|e| CliError::Other(e.to_string()))?;
    }

    String::from_utf8(
        wtr.into_inner()
            .map_err(|e| CliError::Other(e.to_string()))?,
    )
    .map_err(|e| CliError::Other(e.to_string()))
}
