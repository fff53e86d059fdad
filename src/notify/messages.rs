//! Discord webhook payloads

use serde::{Deserialize, Serialize};

use crate::common::types::ItemInfo;
use crate::steam::market::market_listing_url;

/// Body of a webhook execute request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub content: String,
}

impl WebhookMessage {
    /// Low-float alert: name in bold, the float, then the listing URL
    pub fn for_item(item: &ItemInfo) -> Self {
        Self {
            content: format!(
                "**Item: {}**\nFloat: {}\n{}",
                item.full_item_name,
                item.floatvalue,
                market_listing_url(&item.full_item_name)
            ),
        }
    }
}
