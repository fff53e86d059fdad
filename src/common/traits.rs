//! Trait definitions for the network-facing stages of the poll loop

use async_trait::async_trait;

use super::errors::Result;
use super::types::{FetchedPage, ItemInfo};

/// Source of page HTML (the page fetcher in production)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page at `url`, retrying transient failures internally
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// Float value lookup for a single inspect link
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FloatLookup: Send + Sync {
    /// Look up item info for an inspect link
    ///
    /// # Returns
    /// * `Ok(Some(info))` - the service knows the item
    /// * `Ok(None)` - the service answered without an `iteminfo`
    /// * `Err(_)` - the call failed
    async fn lookup(&self, link: &str) -> Result<Option<ItemInfo>>;
}

/// Sink for low-float item notifications
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification about `item`
    async fn notify(&self, item: &ItemInfo) -> Result<()>;
}

/// Boxed page source for dynamic dispatch
pub type BoxedPageSource = Box<dyn PageSource>;
/// Boxed float lookup for dynamic dispatch
pub type BoxedFloatLookup = Box<dyn FloatLookup>;
/// Boxed notifier for dynamic dispatch
pub type BoxedNotifier = Box<dyn Notifier>;
