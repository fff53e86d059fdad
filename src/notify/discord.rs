//! Discord webhook notifier

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument};

use super::messages::WebhookMessage;
use crate::common::errors::{ClientError, Result};
use crate::common::traits::Notifier;
use crate::common::types::ItemInfo;

/// Posts low-float alerts to a Discord webhook
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    /// HTTP client
    client: Client,
    /// Webhook URL
    webhook_url: String,
}

impl DiscordNotifier {
    /// Create a new notifier
    pub fn new(webhook_url: &str) -> Result<Self> {
        Self::with_timeout(webhook_url, Duration::from_secs(30))
    }

    /// Create a new notifier with custom timeout
    pub fn with_timeout(webhook_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
        })
    }

    /// POST a message to the webhook; any 2xx is success
    #[instrument(skip(self, message))]
    pub async fn send(&self, message: &WebhookMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await
            .map_err(|e| ClientError::Notify(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Notify(format!(
                "Webhook returned status {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, item: &ItemInfo) -> Result<()> {
        self.send(&WebhookMessage::for_item(item)).await?;
        info!(
            "Notified Discord: {} (float {})",
            item.full_item_name, item.floatvalue
        );
        Ok(())
    }
}
