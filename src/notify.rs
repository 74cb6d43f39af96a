//! Notification side channel.
//!
//! Lifecycle transitions dispatch notifications after the authoritative
//! transaction commits. Delivery is fire-and-forget: a failed dispatch is
//! logged and never rolls back or fails the transition.

use async_trait::async_trait;
use uuid::Uuid;

/// A notification addressed to one user, identified by a message template
/// plus parameters. The transport behind this trait is out of scope here.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Recipient user id
    pub recipient_id: Uuid,
    /// Template identifier, e.g. "tender_submitted", "checklist_assigned"
    pub template: String,
    /// Template parameters
    pub params: serde_json::Value,
}

/// Outbound notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Dispatch a notification. Implementations should not block the caller
    /// longer than necessary; errors are swallowed by the caller.
    async fn send(&self, notification: Notification) -> anyhow::Result<()>;
}

/// Notifier that records dispatches in the log and delivers nowhere.
///
/// The default wiring until a real channel is configured; also what tests
/// run against.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> anyhow::Result<()> {
        tracing::info!(
            recipient_id = %notification.recipient_id,
            template = %notification.template,
            params = %notification.params,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Fire-and-forget dispatch helper: logs failures, never propagates them.
pub async fn dispatch(notifier: &dyn Notifier, notification: Notification) {
    let template = notification.template.clone();
    if let Err(err) = notifier.send(notification).await {
        tracing::warn!(template = %template, error = %err, "Notification dispatch failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _notification: Notification) -> anyhow::Result<()> {
            anyhow::bail!("channel unavailable")
        }
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let notification = Notification {
            recipient_id: Uuid::new_v4(),
            template: "tender_submitted".to_string(),
            params: json!({"reference": "BTD-20250601-AB12CD"}),
        };

        // Must not panic or propagate
        dispatch(&FailingNotifier, notification).await;
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        let notification = Notification {
            recipient_id: Uuid::new_v4(),
            template: "checklist_assigned".to_string(),
            params: json!({}),
        };

        assert!(LogNotifier.send(notification).await.is_ok());
    }
}
