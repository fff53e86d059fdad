//! Inspect link extraction from raw HTML

use scraper::{Html, Selector};
use std::collections::HashSet;

/// Prefix shared by every CS2 inspect link this crate watches
pub const INSPECT_LINK_PREFIX: &str =
    "steam://rungame/730/76561202255233023/+csgo_econ_action_preview";

/// Collect distinct `<a href>` values starting with [`INSPECT_LINK_PREFIX`]
///
/// Links come back in document order of first appearance. Broken markup
/// never fails; the parser recovers and unparseable fragments simply
/// yield nothing.
pub fn extract_inspect_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchors = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in document.select(&anchors) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if href.starts_with(INSPECT_LINK_PREFIX) && seen.insert(href) {
            links.push(href.to_string());
        }
    }

    links
}
