//! Common test utilities and fixtures

#![allow(dead_code)]

use float_sniper::steam::INSPECT_LINK_PREFIX;
use float_sniper::RetryPolicy;
use serde_json::{json, Value};
use std::time::Duration;

/// Short delays so retry tests finish quickly
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        retry_delay: Duration::from_millis(20),
        rate_limit_delay: Duration::from_millis(200),
    }
}

/// A well-formed inspect link for asset `n`
pub fn inspect_link(n: u32) -> String {
    format!("{}%20M62800{}A{}D1234567", INSPECT_LINK_PREFIX, n, 2_000_000 + n)
}

/// Market page with one "Inspect in Game" anchor per link plus unrelated anchors
pub fn listing_page(links: &[String]) -> String {
    let rows: String = links
        .iter()
        .map(|l| {
            format!(
                r#"<div class="market_listing_row">
                    <a class="btn_small" href="{l}">Inspect in Game...</a>
                    <a href="https://steamcommunity.com/profiles/76561198000000000">Seller</a>
                </div>"#
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html><html><head><title>Listings</title></head>
        <body><a href="/market/">Back to market</a>{rows}</body></html>"#
    )
}

/// Float lookup response body for an item
pub fn iteminfo_body(name: &str, floatvalue: f64) -> Value {
    json!({
        "iteminfo": {
            "full_item_name": name,
            "floatvalue": floatvalue,
            "paintseed": 661,
            "paintindex": 44,
            "defindex": 7,
            "wear_name": "Factory New"
        }
    })
}
