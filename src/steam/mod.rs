//! Steam side of the pipeline: page fetching, inspect links and market URLs

pub mod fetcher;
pub mod links;
pub mod market;

pub use fetcher::{PageFetcher, RetryPolicy};
pub use links::{extract_inspect_links, INSPECT_LINK_PREFIX};
pub use market::market_listing_url;
