//! Rate-limited operator notifications.
//!
//! The gate decides whether an alert may go out; the actual delivery is
//! behind the [`Notifier`] trait so the transport stays an external
//! collaborator. Counters persist to a small JSON blob so the limits
//! survive restarts.

mod gate;
mod state;
mod transport;

pub use gate::{DispatchPolicy, GateConfig, NotificationGate, NotifyOutcome, SUMMARY_KEY};
pub use state::NotificationState;
pub use transport::{LogNotifier, Notifier};

use crate::types::AuthResult;
use std::path::Path;
use std::time::Duration;

/// Build the subject and body for a verified-credential alert.
pub fn found_message(result: &AuthResult) -> (String, String) {
    let subject = format!("Working SMTP found: {}", result.host);
    let banner = crate::output::truncate_string(&result.banner, 100);
    let body = format!(
        "Host: {}\n\
         Username: {}\n\
         Password: {}\n\
         Domain: {}\n\
         Banner: {}\n\n\
         This server has been verified as working with authentication.",
        result.host, result.username, result.password, result.domain, banner
    );
    (subject, body)
}

/// Build the subject and body for the end-of-scan summary alert.
pub fn summary_message(
    found: usize,
    tasks: usize,
    workers: usize,
    elapsed: Duration,
    raw_path: &Path,
    report_path: &Path,
) -> (String, String) {
    let subject = format!("Scan complete - {found} working servers");
    let body = format!(
        "Scan completed.\n\n\
         Results:\n\
         - Working authenticated servers: {found}\n\
         - Tasks processed: {tasks}\n\
         - Total scan time: {:.2} seconds\n\
         - Worker count: {workers}\n\n\
         Files:\n\
         - {} (formatted report)\n\
         - {} (raw data)",
        elapsed.as_secs_f64(),
        report_path.display(),
        raw_path.display(),
    );
    (subject, body)
}
