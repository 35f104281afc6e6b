//! Work items and verified results.

use crate::types::HostTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of work: a host plus a credential pair to try against it.
///
/// Immutable once enqueued. Empty credentials mark a liveness-only probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTask {
    pub host: HostTarget,
    pub user: String,
    pub password: String,
}

impl ProbeTask {
    /// Create a liveness-only task for a host.
    pub fn liveness(host: HostTarget) -> Self {
        Self {
            host,
            user: String::new(),
            password: String::new(),
        }
    }

    /// Create a credential-verification task.
    pub fn with_credentials(
        host: HostTarget,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host,
            user: user.into(),
            password: password.into(),
        }
    }

    /// Whether this task only checks liveness.
    pub fn is_liveness_only(&self) -> bool {
        self.user.is_empty() || self.password.is_empty()
    }
}

/// A verified authentication success.
///
/// Produced by exactly one worker per task, only when the full AUTH LOGIN
/// exchange reached its success reply, then handed by value to the
/// coordinator for storage and notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    /// The host as the operator supplied it.
    pub host: String,
    /// Full login name, `localpart@domain` with the banner-derived domain.
    pub username: String,
    pub password: String,
    /// The raw server greeting line.
    pub banner: String,
    /// Domain derived from the banner.
    pub domain: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn host() -> HostTarget {
        HostTarget::new("mail.example.com", IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    #[test]
    fn test_liveness_task() {
        let task = ProbeTask::liveness(host());
        assert!(task.is_liveness_only());
    }

    #[test]
    fn test_credential_task() {
        let task = ProbeTask::with_credentials(host(), "admin", "hunter2");
        assert!(!task.is_liveness_only());
        assert_eq!(task.user, "admin");
    }

    #[test]
    fn test_half_empty_credentials_are_liveness_only() {
        let task = ProbeTask::with_credentials(host(), "admin", "");
        assert!(task.is_liveness_only());
    }
}
