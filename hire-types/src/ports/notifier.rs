//! Notification port.

use serde::{Deserialize, Serialize};

use crate::domain::AccountId;

/// Events a user is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    HireBooked,
    HireCanceled,
    ReviewReceived,
    TopUpCompleted,
    WithdrawCompleted,
    PaymentFailed,
    PaymentRefunded,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::HireBooked => "HIRE_BOOKED",
            NotificationKind::HireCanceled => "HIRE_CANCELED",
            NotificationKind::ReviewReceived => "REVIEW_RECEIVED",
            NotificationKind::TopUpCompleted => "TOPUP_COMPLETED",
            NotificationKind::WithdrawCompleted => "WITHDRAW_COMPLETED",
            NotificationKind::PaymentFailed => "PAYMENT_FAILED",
            NotificationKind::PaymentRefunded => "PAYMENT_REFUNDED",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Fire-and-forget delivery of user-facing events.
///
/// Called only after the financial operation has committed; an error is
/// logged by the caller and never undoes the operation.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(
        &self,
        account_id: AccountId,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError>;
}
