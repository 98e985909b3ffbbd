// src/crawl/mod.rs
// =============================================================================
// This module finds the pages that belong to a site.
//
// Two sources of URLs:
// - sitemap: reads sitemap.xml (and any nested sitemap indexes)
// - queue: breadth-first crawl following same-site links, with a page budget
//
// Plus the helpers they share:
// - filter: "is this URL on our site?" and "is this URL worth fetching?"
// - links: pulls same-site links out of a page
//
// Why two sources?
// - Sitemaps are cheap and complete when they are maintained
// - Crawling catches the pages someone forgot to put in the sitemap
// =============================================================================

mod filter;
mod links;
mod queue;
mod sitemap;

pub use filter::{authority, is_internal, should_skip, SKIP_PATTERNS};
pub use links::extract_internal_links;
pub use queue::{CrawlOutcome, Crawler, Frontier};
pub use sitemap::{
    parse_sitemap, SitemapDocument, SitemapResolution, SitemapResolver, MAX_SITEMAPS,
    MAX_SITEMAP_DEPTH,
};
