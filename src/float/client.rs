//! REST client for the local float lookup service

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use super::messages::FloatApiResponse;
use crate::common::errors::{ClientError, Result};
use crate::common::traits::FloatLookup;
use crate::common::types::ItemInfo;

/// Client for the float lookup sidecar
#[derive(Debug, Clone)]
pub struct FloatApiClient {
    /// HTTP client
    client: Client,
    /// Base URL of the service
    base_url: String,
}

impl FloatApiClient {
    /// Create a new client
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a new client with custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Get item info for an inspect link
    #[instrument(skip(self))]
    pub async fn get_item_info(&self, link: &str) -> Result<Option<ItemInfo>> {
        debug!("Looking up float for: {}", link);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("url", link)])
            .send()
            .await
            .map_err(|e| lookup_error(link, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(lookup_error(
                link,
                format!("Server returned status {}: {}", status, body),
            ));
        }

        let body = response.text().await.map_err(|e| lookup_error(link, e))?;
        let parsed: FloatApiResponse =
            serde_json::from_str(&body).map_err(|e| lookup_error(link, e))?;
        Ok(parsed.iteminfo)
    }
}

#[async_trait]
impl FloatLookup for FloatApiClient {
    async fn lookup(&self, link: &str) -> Result<Option<ItemInfo>> {
        self.get_item_info(link).await
    }
}

fn lookup_error(link: &str, cause: impl std::fmt::Display) -> ClientError {
    ClientError::Lookup {
        link: link.to_string(),
        message: cause.to_string(),
    }
}
