//! # Mailsweep - A Concurrent SMTP Credential Auditing Scanner
//!
//! Mailsweep probes lists of hosts for live SMTP submission services and
//! verifies credential pairs against them, for use in authorized security
//! assessments of mail infrastructure.
//!
//! ## Features
//!
//! - **Concurrent Scanning**: Fixed worker pool over a shared task queue
//! - **Protocol State Machine**: Banner, EHLO, and AUTH LOGIN exchange with
//!   per-step timeouts
//! - **Flexible Targeting**: IPs, hostnames, and CIDR ranges in the hosts list
//! - **Rate-Limited Alerts**: Per-host and hourly notification caps that
//!   survive restarts
//! - **Durable Results**: Append-only raw log plus a regenerable report
//! - **Multiple Export Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use mailsweep::protocol::{Liveness, SmtpProbe};
//! use mailsweep::types::HostTarget;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let probe = SmtpProbe::new(25, Duration::from_secs(15), "probe.local");
//!     let host = HostTarget::new("192.0.2.10", "192.0.2.10".parse().unwrap());
//!
//!     match probe.check_liveness(&host).await {
//!         Liveness::Live { banner } => println!("live: {}", banner),
//!         Liveness::Dead { reason } => println!("dead: {}", reason),
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`types`] - Core type definitions (tasks, targets, scan IDs)
//! - [`protocol`] - The SMTP handshake state machine and probes
//! - [`scanner`] - Worker pool, task queue, and scan coordination
//! - [`notify`] - Rate-limited operator notifications
//! - [`storage`] - Raw result log and report generation
//! - [`config`] - Settings, paths, and input lists
//! - [`error`] - Comprehensive error types
//! - [`output`] - Terminal output formatting utilities

pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod output;
pub mod protocol;
pub mod scanner;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ConfigError, NotifyError, ProbeError, StorageError};
pub use protocol::{Liveness, SmtpProbe};
pub use scanner::{run_scan, ScanJob, ScanSummary};
pub use types::{AuthResult, HostTarget, ProbeTask, ScanId};
