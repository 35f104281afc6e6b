//! Scan coordination.
//!
//! [`run_scan`] owns the whole lifecycle: it seeds the task queue,
//! starts the worker pool, drains verified results into the store and
//! the notification gate, and shuts everything down in order. Results
//! arrive in no particular order; consumers must not assume one.

pub mod rate_limiter;
pub mod tasks;
pub mod worker;

use crate::config::ScanSettings;
use crate::notify::{self, NotificationGate, SUMMARY_KEY};
use crate::output;
use crate::protocol::SmtpProbe;
use crate::storage::ResultStore;
use crate::types::{HostTarget, ScanId};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

pub use rate_limiter::RateLimiter;
pub use tasks::{build_tasks, TaskQueue};
pub use worker::{run_worker, WorkerContext};

/// One scan run, assembled once at startup.
pub struct ScanJob {
    pub id: ScanId,
    pub hosts: Vec<HostTarget>,
    pub users: Vec<String>,
    pub passwords: Vec<String>,
    /// Fixed worker pool size.
    pub workers: usize,
    pub settings: ScanSettings,
    /// Suppress per-result console lines.
    pub quiet: bool,
    /// Show a progress bar over the task set.
    pub show_progress: bool,
}

/// What a finished scan looked like.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub id: ScanId,
    pub tasks_total: usize,
    pub found: usize,
    pub workers: usize,
    pub elapsed: Duration,
}

/// Execute a complete scan.
///
/// Persistence and notification failures are logged and never abort the
/// scan; by the time this returns, all workers have exited (or been
/// aborted after the shutdown grace period) and the report has been
/// regenerated.
pub async fn run_scan(
    job: ScanJob,
    store: &ResultStore,
    gate: &mut NotificationGate,
    cancel: CancellationToken,
) -> ScanSummary {
    let start = Instant::now();

    let tasks = build_tasks(&job.hosts, &job.users, &job.passwords);
    let total = tasks.len();
    tracing::info!(
        scan = %job.id.short(),
        workers = job.workers,
        tasks = total,
        "starting scan"
    );

    let queue = TaskQueue::seed(tasks);
    let (result_tx, mut result_rx) = mpsc::unbounded_channel();
    let probe = Arc::new(SmtpProbe::new(
        job.settings.port,
        job.settings.timeout(),
        job.settings.helo_name.clone(),
    ));
    let limiter = RateLimiter::per_second(job.settings.rate_limit);

    let progress = if job.show_progress {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut pool = JoinSet::new();
    for id in 0..job.workers {
        pool.spawn(run_worker(WorkerContext {
            id,
            queue: queue.clone(),
            results: result_tx.clone(),
            probe: Arc::clone(&probe),
            limiter: limiter.clone(),
            cancel: cancel.clone(),
            progress: progress.clone(),
        }));
    }
    // Workers hold the only senders now; the channel closes when the
    // last of them exits.
    drop(result_tx);

    let mut found = 0usize;
    while let Some(result) = result_rx.recv().await {
        found += 1;

        if !job.quiet {
            output::print_found(found, &result);
        }
        if let Some(bar) = &progress {
            bar.set_message(format!("found: {}", result.host));
        }

        if let Err(e) = store.append(&result) {
            tracing::error!(host = %result.host, error = %e, "failed to persist result");
        }

        let (subject, body) = notify::found_message(&result);
        gate.notify(&result.host, &subject, &body).await;
    }

    let grace = job.settings.shutdown_grace();
    let drained = tokio::time::timeout(grace, async {
        while pool.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        tracing::warn!(grace = ?grace, "workers did not stop in time, aborting the rest");
        pool.abort_all();
        while pool.join_next().await.is_some() {}
    }

    if let Some(bar) = progress {
        bar.finish_with_message("scan complete");
    }

    let summary = ScanSummary {
        id: job.id,
        tasks_total: total,
        found,
        workers: job.workers,
        elapsed: start.elapsed(),
    };

    match store.write_report() {
        Ok(count) => {
            tracing::info!(
                records = count,
                report = %store.report_path().display(),
                "report regenerated"
            );
        }
        Err(e) => tracing::error!(error = %e, "failed to regenerate report"),
    }

    if summary.found > 0 {
        let (subject, body) = notify::summary_message(
            summary.found,
            summary.tasks_total,
            summary.workers,
            summary.elapsed,
            store.raw_path(),
            store.report_path(),
        );
        gate.notify(SUMMARY_KEY, &subject, &body).await;
    }

    tracing::info!(
        scan = %summary.id.short(),
        found = summary.found,
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "scan finished"
    );

    summary
}
