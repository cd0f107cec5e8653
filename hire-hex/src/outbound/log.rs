use hire_types::{AccountId, NotificationKind, Notifier, NotifyError};

/// Writes notifications to the trace log. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        account_id: AccountId,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError> {
        tracing::info!(%account_id, %kind, %payload, "notification");
        Ok(())
    }
}
