//! Error types for Mailsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Each layer of the
//! crate has its own error enum; `CliError` aggregates them at the
//! command boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while probing a single endpoint.
///
/// Connectivity and protocol failures are deliberately lumped together:
/// both abandon the current task without retry and never abort the scan.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("connection timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("unexpected reply during {stage}: {reply}")]
    UnexpectedReply { stage: &'static str, reply: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors from the raw result log, report, or state persistence.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to append record: {0}")]
    AppendFailed(String),

    #[error("failed to read raw log: {0}")]
    ReadFailed(String),

    #[error("failed to write file: {0}")]
    WriteFailed(String),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Configuration errors are fatal: the run aborts with no tasks processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine application directories")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("no hosts to scan (add entries to {0})")]
    NoHosts(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure of the outbound notification transport.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),
}

/// Top-level error for CLI command execution.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
