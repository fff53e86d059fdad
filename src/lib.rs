//! float_sniper Library
//!
//! Polls market pages for CS2 inspect links, looks up each new link's
//! float value through a local lookup service and posts low-float items
//! to a Discord webhook.

pub mod common;
pub mod config;
pub mod float;
pub mod notify;
pub mod poller;
pub mod steam;

// Re-export commonly used types
pub use common::errors::{ClientError, Result};
pub use common::traits::{FloatLookup, Notifier, PageSource};
pub use common::types::{FetchedPage, ItemInfo, TickReport};
pub use config::types::{AppConfig, AppSettings, PageConfig};
pub use float::FloatApiClient;
pub use notify::{DiscordNotifier, WebhookMessage};
pub use poller::{Poller, SeenLinks};
pub use steam::{extract_inspect_links, market_listing_url, PageFetcher, RetryPolicy};
