//! Notification dispatch
//!
//! Committed transitions hand their notices here. Dispatch runs on a
//! spawned task, so a slow or failing gateway never blocks a command
//! reply and never rolls back the transition that produced the notice.
//! Failures are logged and counted, nothing more.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use shared::gateway::NotificationGateway;
use shared::order::notice::{BroadcastContent, BuyerNotice, OperatorNotice};

/// Fire-and-forget notice dispatcher
#[derive(Clone)]
pub struct Notifier {
    gateway: Arc<dyn NotificationGateway>,
    failures: Arc<AtomicU64>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("gateway", &"<NotificationGateway>")
            .field("failures", &self.failures.load(Ordering::Relaxed))
            .finish()
    }
}

impl Notifier {
    pub fn new(gateway: Arc<dyn NotificationGateway>) -> Self {
        Self {
            gateway,
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Notices dropped at the gateway since startup
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Push a notice to one buyer
    pub fn buyer(&self, buyer_id: impl Into<String>, notice: BuyerNotice) {
        let gateway = self.gateway.clone();
        let failures = self.failures.clone();
        let buyer_id = buyer_id.into();
        tokio::spawn(async move {
            if let Err(err) = gateway.notify_buyer(&buyer_id, notice).await {
                failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(buyer = %buyer_id, error = %err, "buyer notice dropped");
            }
        });
    }

    /// Push a notice to the operator group
    pub fn operators(&self, operators: Vec<String>, notice: OperatorNotice) {
        let gateway = self.gateway.clone();
        let failures = self.failures.clone();
        tokio::spawn(async move {
            if let Err(err) = gateway.notify_operators(&operators, notice).await {
                failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %err, "operator notice dropped");
            }
        });
    }

    /// Push broadcast content to a recipient list
    pub fn broadcast(&self, recipients: Vec<String>, content: BroadcastContent) {
        let gateway = self.gateway.clone();
        let failures = self.failures.clone();
        tokio::spawn(async move {
            let count = recipients.len();
            if let Err(err) = gateway.notify_broadcast(&recipients, content).await {
                failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(recipients = count, error = %err, "broadcast dropped");
            }
        });
    }
}
