//! Connection-level probes built on [`SmtpSession`].
//!
//! `SmtpProbe` is stateless across calls; each probe owns one connection
//! from connect to close. The socket is released on every exit path by
//! construction: the session (and the stream inside it) is dropped
//! before the probe returns, whether the exchange succeeded or not.

use crate::error::{ProbeError, ProbeResult};
use crate::protocol::domain::domain_from_banner;
use crate::protocol::session::SmtpSession;
use crate::types::{AuthResult, HostTarget};
use chrono::Utc;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Outcome of a liveness probe.
#[derive(Debug, Clone)]
pub enum Liveness {
    /// The endpoint answered the banner and greeting exchange.
    Live { banner: String },
    /// The endpoint did not behave like a mail-submission service.
    Dead { reason: String },
}

/// Probes one endpoint per call over a fresh, timeout-bound connection.
pub struct SmtpProbe {
    port: u16,
    timeout: Duration,
    helo_name: String,
}

impl SmtpProbe {
    /// Create a new probe.
    ///
    /// # Arguments
    /// * `port` - Destination port for every connection
    /// * `timeout` - Bound applied to connect and to each protocol step
    /// * `helo_name` - Name announced in the EHLO greeting
    pub fn new(port: u16, timeout: Duration, helo_name: impl Into<String>) -> Self {
        Self {
            port,
            timeout,
            helo_name: helo_name.into(),
        }
    }

    /// Check whether a host runs a live submission service.
    ///
    /// Connect, read the banner, greet, and terminate cleanly. Never
    /// returns an error: a host that fails anywhere is simply not live.
    pub async fn check_liveness(&self, host: &HostTarget) -> Liveness {
        match self.liveness_exchange(host).await {
            Ok(banner) => Liveness::Live { banner },
            Err(e) => Liveness::Dead {
                reason: e.to_string(),
            },
        }
    }

    async fn liveness_exchange(&self, host: &HostTarget) -> ProbeResult<String> {
        let stream = self.connect(host).await?;
        let mut session = SmtpSession::open(stream, self.timeout).await?;
        let banner = session.banner().to_string();
        session.greet(&self.helo_name).await?;
        session.quit().await;
        Ok(banner)
    }

    /// Run the full credential exchange against a host.
    ///
    /// Returns `Ok(Some(_))` only when the server accepted the
    /// credentials; `Ok(None)` on a clean rejection. Errors cover
    /// connectivity and protocol failures and are expected to be logged
    /// and swallowed by the caller, never escalated.
    pub async fn try_authenticate(
        &self,
        host: &HostTarget,
        user: &str,
        password: &str,
    ) -> ProbeResult<Option<AuthResult>> {
        let stream = self.connect(host).await?;
        let mut session = SmtpSession::open(stream, self.timeout).await?;
        let banner = session.banner().to_string();
        session.greet(&self.helo_name).await?;

        // The login-facing domain comes from the banner, not the caller.
        let domain = domain_from_banner(&banner);
        let username = format!("{user}@{domain}");

        session.request_login().await?;
        session.submit_username(&username).await?;
        let authenticated = session.submit_password(password).await?;
        session.quit().await;

        if authenticated {
            Ok(Some(AuthResult {
                host: host.original.clone(),
                username,
                password: password.to_string(),
                banner,
                domain,
                timestamp: Utc::now(),
            }))
        } else {
            Ok(None)
        }
    }

    async fn connect(&self, host: &HostTarget) -> ProbeResult<TcpStream> {
        let addr = SocketAddr::new(host.ip, self.port);
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => {
                if e.to_string().to_lowercase().contains("refused") {
                    Err(ProbeError::ConnectionRefused)
                } else {
                    Err(ProbeError::ConnectionFailed(e.to_string()))
                }
            }
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[tokio::test]
    async fn test_dead_host_is_not_an_error() {
        let probe = SmtpProbe::new(1, Duration::from_millis(200), "probe.local");
        let host = HostTarget::new("127.0.0.1", IpAddr::V4(Ipv4Addr::LOCALHOST));

        // Port 1 is almost certainly closed
        match probe.check_liveness(&host).await {
            Liveness::Dead { reason } => assert!(!reason.is_empty()),
            Liveness::Live { .. } => panic!("port 1 should not speak SMTP"),
        }
    }
}
