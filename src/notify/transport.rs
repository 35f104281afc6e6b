//! The outbound delivery capability.

use crate::error::NotifyError;
use async_trait::async_trait;

/// Delivers a composed message to the operator.
///
/// Implementations own all transport detail; the gate only decides
/// whether a message may be sent at all.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Default transport: writes the alert into the execution log.
///
/// Stands in until an operator wires a real delivery channel.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(%subject, %body, "operator notification");
        Ok(())
    }
}
