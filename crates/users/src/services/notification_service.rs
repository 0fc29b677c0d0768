//! Outbound notification delivery.
//!
//! Confirmation codes leave the system through a [`Notifier`]. The default
//! implementation writes the message to the log, which is where a
//! development deployment reads its codes from; a real mail transport plugs
//! in behind the same trait.

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Sink for outbound messages addressed to a single recipient.
pub trait Notifier: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

/// Notifier that emits messages as structured log events.
#[derive(Debug, Clone)]
pub struct TracingNotifier {
    sender: String,
}

impl TracingNotifier {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

impl Notifier for TracingNotifier {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        info!(from = %self.sender, to, subject, body, "outbound mail");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_notifier_never_fails() {
        let notifier = TracingNotifier::new("noreply@example.com");
        assert!(notifier
            .send("alice@example.com", "Hello", "body text")
            .is_ok());
    }
}
