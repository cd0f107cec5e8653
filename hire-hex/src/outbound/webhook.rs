//! Delivers notifications as signed HTTP POSTs.

use hire_types::{AccountId, NotificationKind, Notifier, NotifyError};
use serde_json::json;

use super::signing::sign_payload;

pub const SIGNATURE_HEADER: &str = "X-Signature";

/// POSTs `{account_id, kind, payload}` to a fixed URL.
///
/// Delivery runs on a spawned task so the caller never waits on the network.
/// Failures are logged there; `notify` only fails if the body cannot be
/// serialized.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    target_url: String,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(target_url: impl Into<String>, secret: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            target_url: target_url.into(),
            secret,
        }
    }

    fn request(&self, body: Vec<u8>) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .post(&self.target_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(signature) = self
            .secret
            .as_deref()
            .and_then(|secret| sign_payload(&body, secret))
        {
            request = request.header(SIGNATURE_HEADER, signature);
        }
        request.body(body)
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(
        &self,
        account_id: AccountId,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(&json!({
            "account_id": account_id,
            "kind": kind,
            "payload": payload,
        }))
        .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        let request = self.request(body);
        let target = self.target_url.clone();
        tokio::spawn(async move {
            match request.send().await {
                Ok(resp) if resp.status().is_success() => {
                    tracing::debug!(%account_id, %kind, "webhook delivered");
                }
                Ok(resp) => {
                    tracing::warn!(%account_id, %kind, %target, status = %resp.status(), "webhook rejected");
                }
                Err(e) => {
                    tracing::warn!(%account_id, %kind, %target, error = %e, "webhook delivery failed");
                }
            }
        });
        Ok(())
    }
}
