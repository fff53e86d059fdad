//! Types shared between the fetch, lookup, notify and poll stages

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Item metadata returned by the float lookup service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    /// Market hash name, e.g. "AK-47 | Redline (Field-Tested)"
    pub full_item_name: String,
    /// Wear value of this item instance (0.0 to 1.0)
    pub floatvalue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paintseed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paintindex: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defindex: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wear_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imageurl: Option<String>,
}

impl ItemInfo {
    /// Create an item with only the required fields set
    pub fn new(full_item_name: impl Into<String>, floatvalue: f64) -> Self {
        Self {
            full_item_name: full_item_name.into(),
            floatvalue,
            paintseed: None,
            paintindex: None,
            defindex: None,
            wear_name: None,
            imageurl: None,
        }
    }

    /// Inclusive threshold check: an item exactly at `max_float` qualifies
    pub fn is_under(&self, max_float: f64) -> bool {
        self.floatvalue <= max_float
    }
}

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// Response body
    pub body: String,
    /// Number of HTTP requests made, including the successful one
    pub attempts: u32,
    /// Total time spent in backoff sleeps
    pub waited: Duration,
}

/// Counters collected over one pass across all configured pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Pages fetched and parsed
    pub pages_scanned: usize,
    /// Pages skipped because the fetch failed
    pub pages_skipped: usize,
    /// Unique inspect links seen across all pages
    pub links_found: usize,
    /// Links claimed and looked up this tick
    pub links_checked: usize,
    /// Lookups that failed or returned no item info
    pub lookups_failed: usize,
    /// Notifications delivered
    pub notifications_sent: usize,
    /// Notifications that could not be delivered
    pub notifications_failed: usize,
}

impl TickReport {
    /// Fold a single page's counters into the tick totals
    pub fn absorb(&mut self, page: TickReport) {
        self.pages_scanned += page.pages_scanned;
        self.pages_skipped += page.pages_skipped;
        self.links_found += page.links_found;
        self.links_checked += page.links_checked;
        self.lookups_failed += page.lookups_failed;
        self.notifications_sent += page.notifications_sent;
        self.notifications_failed += page.notifications_failed;
    }
}
