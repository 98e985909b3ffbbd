// src/crawl/links.rs
// =============================================================================
// Pulls same-site links out of a fetched HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (html5ever underneath, so broken markup is fine)
// - Supports CSS selectors for finding elements
//
// And the `url` crate to resolve relative hrefs against the page URL.
//
// Every returned link is absolute, on the crawl's root domain, and has its
// #fragment removed. Skip-pattern filtering and "already seen" checks are the
// crawler's job, not ours.
// =============================================================================

use super::filter::is_internal;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    // Constant selector, parsing cannot fail.
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("valid anchor selector"))
}

/// Extracts internal, fragment-free links from `html`, in document order.
pub fn extract_internal_links(html: &str, page_url: &Url, root_domain: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(anchor_selector())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(page_url, href))
        .filter(|url| is_internal(url.as_str(), root_domain))
        .map(|url| strip_fragment(url).to_string())
        .collect()
}

// Resolves an href relative to the page it appeared on.
//
// Pure in-page anchors ("#top") are dropped up front: they point back at the
// page we are already on.
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.starts_with('#') {
        return None;
    }
    base.join(href).ok()
}

pub fn strip_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}
