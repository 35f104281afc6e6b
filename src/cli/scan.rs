//! Scan subcommand implementation.

use crate::config::{ensure_input_files, load_inputs, InputFiles, Paths, ScanSettings};
use crate::error::{CliResult, ConfigError};
use crate::notify::{GateConfig, LogNotifier, NotificationGate};
use crate::output;
use crate::scanner::{run_scan, ScanJob};
use crate::storage::ResultStore;
use crate::types::{resolve_hosts, ScanId};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Scan hosts for live services and working credentials.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Number of concurrent workers
    #[arg(value_name = "WORKERS", value_parser = clap::value_parser!(u32).range(1..))]
    pub workers: u32,

    /// Hosts list (IPs, hostnames, or CIDR ranges, one per line)
    #[arg(long, default_value = "hosts.txt")]
    pub hosts: PathBuf,

    /// Usernames list
    #[arg(long, default_value = "users.txt")]
    pub users: PathBuf,

    /// Passwords list
    #[arg(long, default_value = "passwords.txt")]
    pub passwords: PathBuf,

    /// Destination port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Connect/read timeout in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Rate limit in connection attempts per second (0 = unlimited)
    #[arg(short = 'r', long = "rate")]
    pub rate_limit: Option<u32>,

    /// Disable operator notifications for this run
    #[arg(long)]
    pub no_notify: bool,

    /// Append-only raw result log
    #[arg(long, default_value = "found_servers.txt")]
    pub raw_log: PathBuf,

    /// Formatted report regenerated after the scan
    #[arg(long, default_value = "found_servers_report.txt")]
    pub report: PathBuf,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(
        &self,
        mut settings: ScanSettings,
        verbose: bool,
        quiet: bool,
    ) -> CliResult<()> {
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_ms = timeout;
        }
        if let Some(rate) = self.rate_limit {
            settings.rate_limit = rate;
        }
        if self.no_notify {
            settings.notifications_enabled = false;
        }

        let files = InputFiles {
            hosts: self.hosts.clone(),
            users: self.users.clone(),
            passwords: self.passwords.clone(),
        };
        ensure_input_files(&files)?;
        let inputs = load_inputs(&files)?;

        if inputs.hosts.is_empty() {
            return Err(ConfigError::NoHosts(files.hosts.display().to_string()).into());
        }

        let hosts = resolve_hosts(&inputs.hosts).await;
        if hosts.is_empty() {
            return Err(ConfigError::NoHosts(files.hosts.display().to_string()).into());
        }

        let tasks_estimate = if inputs.users.is_empty() || inputs.passwords.is_empty() {
            hosts.len()
        } else {
            hosts.len() * inputs.users.len() * inputs.passwords.len()
        };

        let id = ScanId::new();
        if !quiet {
            output::print_scan_header(&id, self.workers as usize, hosts.len(), tasks_estimate);
        }

        let store = ResultStore::new(self.raw_log.clone(), self.report.clone());
        let mut gate = NotificationGate::new(
            GateConfig {
                state_path: Paths::get().state_file(),
                max_per_hour: settings.max_notifications_per_hour,
                min_interval_secs: settings.min_notification_interval_secs,
                policy: settings.dispatch_policy,
                enabled: settings.notifications_enabled,
            },
            Box::new(LogNotifier),
        );

        // Ctrl-C requests cooperative shutdown; workers finish their
        // current task first.
        let cancel = CancellationToken::new();
        let ctrlc = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("interrupt received, finishing in-flight tasks");
            ctrlc.cancel();
        });

        let job = ScanJob {
            id,
            hosts,
            users: inputs.users,
            passwords: inputs.passwords,
            workers: self.workers as usize,
            settings,
            quiet,
            show_progress: verbose && !quiet,
        };

        let summary = run_scan(job, &store, &mut gate, cancel).await;

        if !quiet {
            output::print_summary(&summary, store.raw_path(), store.report_path());
        }

        Ok(())
    }
}
