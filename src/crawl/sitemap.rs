// src/crawl/sitemap.rs
// =============================================================================
// Turns a sitemap URL into a flat set of page URLs.
//
// A sitemap is either:
// - a <urlset> listing pages:          <url><loc>https://...</loc></url>
// - a <sitemapindex> listing sitemaps: <sitemap><loc>https://...</loc></sitemap>
//
// Indexes can nest. Instead of recursing, we keep an explicit stack of
// (sitemap URL, depth) pairs plus a set of sitemaps already read:
// - a sitemap that was already read is not fetched again (stops cycles)
// - anything deeper than max_depth is dropped with a warning
// - after max_sitemaps documents we stop and warn
//
// A sitemap that fails to load or parse adds a warning and no URLs; the rest
// of the tree is still resolved.
// =============================================================================

use crate::error::SitemapError;
use crate::fetch::Fetcher;
use crate::progress::{ProgressSink, ProgressUpdate, Stage};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::{BTreeSet, HashSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How many levels of nested sitemap indexes to follow.
pub const MAX_SITEMAP_DEPTH: usize = 10;

/// How many sitemap documents one resolution may fetch.
pub const MAX_SITEMAPS: usize = 500;

/// What a single sitemap document contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// Nested sitemap URLs, in document order.
    Index(Vec<String>),
    /// Page URLs, in document order.
    UrlSet(Vec<String>),
}

/// Everything a resolution produced.
#[derive(Debug, Clone, Default)]
pub struct SitemapResolution {
    pub urls: BTreeSet<String>,
    pub warnings: Vec<String>,
    pub sitemaps_read: usize,
}

pub struct SitemapResolver<'a> {
    fetcher: &'a Fetcher,
    max_depth: usize,
    max_sitemaps: usize,
}

impl<'a> SitemapResolver<'a> {
    pub fn new(fetcher: &'a Fetcher) -> Self {
        Self {
            fetcher,
            max_depth: MAX_SITEMAP_DEPTH,
            max_sitemaps: MAX_SITEMAPS,
        }
    }

    pub fn with_limits(mut self, max_depth: usize, max_sitemaps: usize) -> Self {
        self.max_depth = max_depth;
        self.max_sitemaps = max_sitemaps;
        self
    }

    /// Resolves `sitemap_url` and every sitemap it (transitively) points to.
    pub async fn resolve(
        &self,
        sitemap_url: &str,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> SitemapResolution {
        info!(sitemap = sitemap_url, "resolving sitemap");

        let mut resolution = SitemapResolution::default();
        let mut visited = HashSet::new();
        let mut stack = vec![(sitemap_url.trim().to_string(), 0usize)];

        while let Some((url, depth)) = stack.pop() {
            if cancel.is_cancelled() {
                break;
            }
            // Depth first: a sitemap dropped as too deep on one branch must
            // still be readable from a shallower one.
            if depth > self.max_depth {
                let message = format!(
                    "Sitemap {} is nested more than {} levels deep; skipped",
                    url, self.max_depth
                );
                warn!("{}", message);
                resolution.warnings.push(message);
                continue;
            }
            if !visited.insert(url.clone()) {
                debug!(sitemap = %url, "sitemap already read, skipping");
                continue;
            }
            if resolution.sitemaps_read >= self.max_sitemaps {
                let message = format!(
                    "Stopped after reading {} sitemaps; {} more not read",
                    self.max_sitemaps,
                    stack.len() + 1
                );
                warn!("{}", message);
                resolution.warnings.push(message);
                break;
            }

            resolution.sitemaps_read += 1;
            progress.update(ProgressUpdate {
                stage: Stage::Sitemap,
                current: resolution.sitemaps_read,
                total: resolution.sitemaps_read + stack.len(),
                url: url.clone(),
            });

            match self.fetch_and_parse(&url).await {
                Ok(SitemapDocument::Index(children)) => {
                    debug!(sitemap = %url, children = children.len(), "sitemap index");
                    // Reversed so the first child is resolved first
                    stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
                }
                Ok(SitemapDocument::UrlSet(pages)) => {
                    debug!(sitemap = %url, pages = pages.len(), "url set");
                    resolution.urls.extend(pages);
                }
                Err(e) => {
                    let message = format!("Error reading sitemap {}: {}", url, e);
                    warn!("{}", message);
                    resolution.warnings.push(message);
                }
            }
        }

        info!(
            urls = resolution.urls.len(),
            sitemaps = resolution.sitemaps_read,
            "sitemap resolved"
        );
        resolution
    }

    async fn fetch_and_parse(&self, url: &str) -> Result<SitemapDocument, SitemapError> {
        let body = self.fetcher.fetch_document(url).await?;
        parse_sitemap(&body)
    }
}

#[derive(Clone, Copy)]
enum EntryKind {
    Sitemap,
    Page,
}

/// Parses one sitemap document.
///
/// If it has any `<sitemap>` element at all (even one without a `<loc>`) it
/// is treated as an index and `<url>` entries are ignored. Element names are matched without their namespace
/// prefix. Only the first `<loc>` of each entry counts, trimmed; entries
/// without one are dropped.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, SitemapError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut sitemaps = Vec::new();
    let mut pages = Vec::new();

    let mut is_index = false;
    let mut entry: Option<(EntryKind, Option<String>)> = None;
    let mut in_loc = false;
    let mut loc_text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sitemap" => {
                    is_index = true;
                    entry = Some((EntryKind::Sitemap, None));
                }
                b"url" => entry = Some((EntryKind::Page, None)),
                b"loc" if entry.is_some() => {
                    in_loc = true;
                    loc_text.clear();
                }
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"sitemap" => is_index = true,
            Event::Text(e) if in_loc => loc_text.push_str(&e.unescape()?),
            Event::CData(e) if in_loc => {
                loc_text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"loc" if in_loc => {
                    in_loc = false;
                    let loc = loc_text.trim();
                    if let Some((_, slot)) = entry.as_mut() {
                        if slot.is_none() && !loc.is_empty() {
                            *slot = Some(loc.to_string());
                        }
                    }
                }
                b"sitemap" | b"url" => {
                    if let Some((kind, Some(loc))) = entry.take() {
                        match kind {
                            EntryKind::Sitemap => sitemaps.push(loc),
                            EntryKind::Page => pages.push(loc),
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if is_index {
        Ok(SitemapDocument::Index(sitemaps))
    } else {
        Ok(SitemapDocument::UrlSet(pages))
    }
}
