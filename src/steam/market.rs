//! Steam Community Market URLs

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Base path for CS2 market listings
pub const MARKET_LISTINGS_BASE: &str = "https://steamcommunity.com/market/listings/730/";

/// Characters `encodeURIComponent` leaves alone
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Market listing page for an item, with the name percent-encoded as one path segment
pub fn market_listing_url(full_item_name: &str) -> String {
    format!(
        "{}{}",
        MARKET_LISTINGS_BASE,
        utf8_percent_encode(full_item_name, COMPONENT)
    )
}
