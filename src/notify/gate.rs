//! The notification rate-limit gate.
//!
//! One gate instance owns the counters; callers hold it exclusively (or
//! behind a single lock), which is what makes `notify` atomic with
//! respect to the hourly counter and per-host timestamps.

use crate::notify::state::NotificationState;
use crate::notify::transport::Notifier;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Host key under which the end-of-scan aggregate is rate-limited.
pub const SUMMARY_KEY: &str = "summary";

/// What counts against the hourly cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Every allowed attempt consumes a slot, delivered or not. The
    /// attempt itself used the send window.
    CountAttempts,
    /// Only successfully delivered notifications consume a slot.
    CountDelivered,
}

/// Outcome of one notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    Disabled,
    HourlyCapReached,
    HostIntervalActive,
    DispatchFailed,
}

/// Gate construction parameters.
pub struct GateConfig {
    /// Where the counters persist across restarts.
    pub state_path: PathBuf,
    /// Maximum sends within any one-hour window.
    pub max_per_hour: u32,
    /// Minimum spacing between sends to the same host key.
    pub min_interval_secs: u64,
    pub policy: DispatchPolicy,
    pub enabled: bool,
}

/// Rate-limits outbound alerts per host key and globally per hour.
pub struct NotificationGate {
    state: NotificationState,
    state_path: PathBuf,
    max_per_hour: u32,
    min_interval: Duration,
    policy: DispatchPolicy,
    enabled: bool,
    notifier: Box<dyn Notifier>,
}

impl NotificationGate {
    /// Create a gate, reloading persisted counters from `state_path`.
    pub fn new(config: GateConfig, notifier: Box<dyn Notifier>) -> Self {
        Self {
            state: NotificationState::load(&config.state_path),
            state_path: config.state_path,
            max_per_hour: config.max_per_hour,
            min_interval: Duration::seconds(config.min_interval_secs as i64),
            policy: config.policy,
            enabled: config.enabled,
            notifier,
        }
    }

    /// Check whether a notification for `host_key` would currently pass
    /// the limits. Rolls the hourly window as a side effect.
    pub fn can_notify(&mut self, host_key: &str) -> bool {
        self.check(host_key, Utc::now()).is_none()
    }

    /// Attempt to send one notification through the gate.
    ///
    /// Under [`DispatchPolicy::CountAttempts`] a failed dispatch still
    /// consumes the slot; state is persisted after every counted send.
    /// Persistence failures are logged and never escalate.
    pub async fn notify(&mut self, host_key: &str, subject: &str, body: &str) -> NotifyOutcome {
        if !self.enabled {
            return NotifyOutcome::Disabled;
        }

        let now = Utc::now();
        if let Some(denied) = self.check(host_key, now) {
            tracing::debug!(host = host_key, outcome = ?denied, "notification suppressed");
            return denied;
        }

        let delivered = match self.notifier.send(subject, body).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(host = host_key, error = %e, "notification dispatch failed");
                false
            }
        };

        if delivered || self.policy == DispatchPolicy::CountAttempts {
            self.record_sent(host_key, now);
        }

        if delivered {
            tracing::info!(host = host_key, %subject, "notification sent");
            NotifyOutcome::Sent
        } else {
            NotifyOutcome::DispatchFailed
        }
    }

    fn check(&mut self, host_key: &str, now: DateTime<Utc>) -> Option<NotifyOutcome> {
        if now - self.state.hour_window_start > Duration::hours(1) {
            self.state.hourly_count = 0;
            self.state.hour_window_start = now;
        }

        if self.state.hourly_count >= self.max_per_hour {
            return Some(NotifyOutcome::HourlyCapReached);
        }

        if let Some(last) = self.state.per_host_last_sent.get(host_key) {
            if now - *last < self.min_interval {
                return Some(NotifyOutcome::HostIntervalActive);
            }
        }

        None
    }

    fn record_sent(&mut self, host_key: &str, now: DateTime<Utc>) {
        self.state
            .per_host_last_sent
            .insert(host_key.to_string(), now);
        self.state.hourly_count += 1;

        if let Err(e) = self.state.save(&self.state_path) {
            tracing::error!(error = %e, "could not persist notification state");
        }
    }
}
