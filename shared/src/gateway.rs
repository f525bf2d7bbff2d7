//! Notification gateway seam
//!
//! The engine never talks to a messaging transport directly. Committed
//! transitions produce notices; a gateway implementation carries them
//! to buyers and operators over whatever transport the deployment uses.

use async_trait::async_trait;
use thiserror::Error;

use crate::order::notice::{BroadcastContent, BuyerNotice, OperatorNotice};

/// Gateway delivery failure
///
/// Reported back to the dispatcher for logging and counting only. A
/// failed notice never invalidates the transition that produced it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("notification gateway: {0}")]
pub struct GatewayError(pub String);

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Outbound boundary to the messaging transport
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Push a notice to a single buyer
    async fn notify_buyer(&self, buyer_id: &str, notice: BuyerNotice) -> Result<(), GatewayError>;

    /// Push a notice to every configured operator
    async fn notify_operators(
        &self,
        operators: &[String],
        notice: OperatorNotice,
    ) -> Result<(), GatewayError>;

    /// Push broadcast content to a recipient list
    async fn notify_broadcast(
        &self,
        recipients: &[String],
        content: BroadcastContent,
    ) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::new("transport closed");
        assert_eq!(format!("{}", err), "notification gateway: transport closed");
    }
}
