//! The worker loop.
//!
//! Workers share nothing mutable with each other; everything they touch
//! arrives through the context. A worker runs each task to completion
//! and only observes cancellation between tasks, so an in-flight probe
//! always finishes or times out on its own.

use crate::protocol::{Liveness, SmtpProbe};
use crate::scanner::rate_limiter::RateLimiter;
use crate::scanner::tasks::TaskQueue;
use crate::types::{AuthResult, ProbeTask};
use indicatif::ProgressBar;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Everything one worker needs.
pub struct WorkerContext {
    pub id: usize,
    pub queue: TaskQueue,
    pub results: mpsc::UnboundedSender<AuthResult>,
    pub probe: Arc<SmtpProbe>,
    pub limiter: Option<RateLimiter>,
    pub cancel: CancellationToken,
    pub progress: Option<ProgressBar>,
}

pub async fn run_worker(ctx: WorkerContext) {
    loop {
        let task = tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            task = ctx.queue.next() => match task {
                Some(task) => task,
                None => break,
            },
        };

        if let Some(limiter) = &ctx.limiter {
            limiter.wait().await;
        }

        process_task(&ctx, &task).await;

        if let Some(progress) = &ctx.progress {
            progress.inc(1);
        }
    }

    tracing::debug!(worker = ctx.id, "worker exiting");
}

async fn process_task(ctx: &WorkerContext, task: &ProbeTask) {
    let host = &task.host;

    match ctx.probe.check_liveness(host).await {
        Liveness::Live { .. } => {
            tracing::info!(host = %host.original, "live SMTP service found");
        }
        Liveness::Dead { reason } => {
            tracing::debug!(host = %host.original, %reason, "host not responding");
            return;
        }
    }

    if task.is_liveness_only() {
        return;
    }

    match ctx
        .probe
        .try_authenticate(host, &task.user, &task.password)
        .await
    {
        Ok(Some(result)) => {
            tracing::info!(
                host = %host.original,
                username = %result.username,
                "authentication succeeded"
            );
            if ctx.results.send(result).is_err() {
                tracing::warn!(host = %host.original, "result channel closed, record dropped");
            }
        }
        Ok(None) => {
            tracing::debug!(host = %host.original, user = %task.user, "authentication rejected");
        }
        Err(e) => {
            tracing::debug!(host = %host.original, error = %e, "authentication attempt failed");
        }
    }
}
