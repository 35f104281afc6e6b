//! Append-only raw result log and report generation.
//!
//! Every verified credential is flushed to the raw log the moment it
//! arrives; durability beats batching here, since a scan can run for
//! hours and die at any point. The formatted report is a pure function
//! of the raw log's contents and can be regenerated at any time.

use crate::error::{StorageError, StorageResult};
use crate::types::AuthResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One parsed line of the raw log.
///
/// Parsing is lenient: the timestamp field may be absent or unreadable
/// in logs carried over from older runs, and such lines still count.
#[derive(Debug, Clone, Serialize)]
pub struct RawRecord {
    pub host: String,
    pub username: String,
    pub password: String,
    pub domain: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawRecord {
    fn parse(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() < 4 {
            return None;
        }

        let timestamp = parts
            .get(4)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(Self {
            host: parts[0].to_string(),
            username: parts[1].to_string(),
            password: parts[2].to_string(),
            domain: parts[3].to_string(),
            timestamp,
        })
    }
}

/// Durable store for verified credentials.
pub struct ResultStore {
    raw_path: PathBuf,
    report_path: PathBuf,
}

impl ResultStore {
    /// Create a store writing to the given raw log and report paths.
    pub fn new(raw_path: PathBuf, report_path: PathBuf) -> Self {
        Self {
            raw_path,
            report_path,
        }
    }

    /// Path of the append-only raw log.
    pub fn raw_path(&self) -> &Path {
        &self.raw_path
    }

    /// Path of the generated report.
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Append one verified record, flushed and synced before returning.
    pub fn append(&self, result: &AuthResult) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.raw_path)
            .map_err(|e| StorageError::AppendFailed(e.to_string()))?;

        let line = format!(
            "{}|{}|{}|{}|{}\n",
            result.host,
            result.username,
            result.password,
            result.domain,
            result.timestamp.to_rfc3339()
        );

        file.write_all(line.as_bytes())
            .map_err(|e| StorageError::AppendFailed(e.to_string()))?;
        file.flush()
            .map_err(|e| StorageError::AppendFailed(e.to_string()))?;
        file.sync_all()
            .map_err(|e| StorageError::AppendFailed(e.to_string()))
    }

    /// Read and parse the whole raw log. A missing log is an empty one.
    pub fn read_raw(&self) -> StorageResult<Vec<RawRecord>> {
        if !self.raw_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.raw_path)
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        Ok(content.lines().filter_map(RawRecord::parse).collect())
    }

    /// Render the formatted report from the current raw log contents.
    ///
    /// Pure with respect to the log: the same log always renders to the
    /// same bytes, so nothing here may consult the wall clock.
    pub fn report_text(&self) -> StorageResult<String> {
        Ok(render_report(&self.read_raw()?))
    }

    /// Regenerate the report file from scratch. Idempotent; returns the
    /// number of records it covers.
    pub fn write_report(&self) -> StorageResult<usize> {
        let records = self.read_raw()?;
        fs::write(&self.report_path, render_report(&records))
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        Ok(records.len())
    }
}

fn render_report(records: &[RawRecord]) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();

    out.push_str(&format!("{rule}\n"));
    out.push_str("VERIFIED MAIL SUBMISSION CREDENTIALS\n");
    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!("Total servers: {}\n", records.len()));
    if let Some(latest) = records.iter().filter_map(|r| r.timestamp).max() {
        out.push_str(&format!("Last entry: {}\n", latest.to_rfc3339()));
    }
    out.push_str(&format!("{rule}\n\n"));

    for (i, record) in records.iter().enumerate() {
        out.push_str(&format!("Server #{}\n", i + 1));
        out.push_str(&format!("Host: {}\n", record.host));
        out.push_str(&format!("Username: {}\n", record.username));
        out.push_str(&format!("Password: {}\n", record.password));
        out.push_str(&format!("Domain: {}\n", record.domain));
        out.push_str(&format!("{}\n", "-".repeat(40)));
    }

    out
}
