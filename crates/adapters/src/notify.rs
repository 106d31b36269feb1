//! Admin notification delivery

use async_trait::async_trait;
use news_fetcher_domain::{AdminNotifier, NotifyError};
use reqwest::Client;
use std::time::Duration;

/// Notifier posting a `{"text": ...}` JSON payload to a webhook
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            webhook_url,
        }
    }
}

#[async_trait]
impl AdminNotifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let body = serde_json::json!({ "text": message });

        self.client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?
            .error_for_status()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        Ok(())
    }
}

/// Fallback notifier for deployments without a webhook: the alert only
/// lands in the logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl AdminNotifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        tracing::error!(message = %message, "Admin notification");
        Ok(())
    }
}
