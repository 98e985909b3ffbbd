// src/scan/pipeline.rs
// =============================================================================
// Runs a whole scan: discover URLs, then fetch and search each one.
//
// Passes, in order:
// 1. Sitemap (if enabled): resolve sitemap.xml into page URLs
// 2. Crawl (if enabled): breadth-first crawl from the root URL
// 3. Scan: fetch every discovered URL again, extract its visible text and
//    search it for the terms
//
// The scan pass fetches pages even if the crawl already loaded them. Each
// pass is self-contained, so a URL is fetched at most once *per pass*.
//
// Pass 3 runs several fetches at once (futures' `buffered`), but:
// - every request waits on one shared Pacer, so the delay caps the total
//   request rate
// - `buffered` yields results in input order, so records come out sorted by
//   URL exactly like a sequential scan would produce them
// - a page's records are built in one go after its fetch, so cancelling
//   never leaves half a page in the report
// =============================================================================

use super::matcher::search_terms;
use super::text::extract_visible_text;
use crate::config::ScanConfig;
use crate::crawl::{Crawler, SitemapResolver};
use crate::error::ConfigError;
use crate::fetch::{Fetcher, Pacer};
use crate::progress::{ProgressSink, ProgressUpdate, Stage};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// One occurrence of one term on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub url: String,
    pub term: String,
    pub snippet: String,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub records: Vec<MatchRecord>,
    /// Distinct URLs found by the sitemap and/or the crawl.
    pub urls_discovered: usize,
    /// URLs whose page loaded and was searched.
    pub urls_scanned: usize,
    /// Non-fatal problems, mostly sitemaps that could not be read.
    pub warnings: Vec<String>,
    /// True if the run was stopped early; the records are still complete
    /// for every page they mention.
    pub cancelled: bool,
}

impl ScanReport {
    pub fn total_matches(&self) -> usize {
        self.records.len()
    }

    /// Number of distinct URLs with at least one match.
    pub fn pages_with_matches(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.url.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn has_matches(&self) -> bool {
        !self.records.is_empty()
    }
}

/// URLs found by the discovery passes.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub urls: BTreeSet<String>,
    pub warnings: Vec<String>,
    pub cancelled: bool,
}

// What happened to one URL in the scan pass.
enum PageOutcome {
    Scanned(Vec<MatchRecord>),
    Unavailable,
    Cancelled,
}

pub struct Scanner {
    config: ScanConfig,
    fetcher: Fetcher,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let fetcher = Fetcher::new(config.fetch_options())?;
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Discovers URLs, then scans them.
    pub async fn run(
        &self,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ConfigError> {
        let discovery = self.discover(progress, cancel).await?;

        let mut report = ScanReport {
            urls_discovered: discovery.urls.len(),
            warnings: discovery.warnings,
            cancelled: discovery.cancelled,
            ..ScanReport::default()
        };

        if report.cancelled {
            return Ok(report);
        }
        if discovery.urls.is_empty() {
            let message = "No URLs collected. Check your URL and sitemap settings.".to_string();
            warn!("{}", message);
            report.warnings.push(message);
            return Ok(report);
        }

        info!(urls = discovery.urls.len(), "scanning pages");
        let (records, scanned, cancelled) = self.scan_urls(&discovery.urls, progress, cancel).await;
        report.records = records;
        report.urls_scanned = scanned;
        report.cancelled = cancelled;

        info!(
            matches = report.total_matches(),
            pages = report.pages_with_matches(),
            scanned = report.urls_scanned,
            "scan finished"
        );
        Ok(report)
    }

    /// Runs the sitemap and crawl passes and unions their URLs.
    pub async fn discover(
        &self,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Discovery, ConfigError> {
        let mut discovery = Discovery::default();

        if let Some(sitemap_url) = self.config.sitemap_url() {
            let resolution = SitemapResolver::new(&self.fetcher)
                .resolve(&sitemap_url, progress, cancel)
                .await;
            info!(urls = resolution.urls.len(), "found URLs in sitemap");
            discovery.urls.extend(resolution.urls);
            discovery.warnings.extend(resolution.warnings);
        }

        if cancel.is_cancelled() {
            discovery.cancelled = true;
            return Ok(discovery);
        }

        if let Some(crawl) = self.config.crawl() {
            let crawler = Crawler::new(self.fetcher.clone(), crawl.max_pages, crawl.delay);
            let outcome = crawler
                .crawl(self.config.root_url(), progress, cancel)
                .await?;
            info!(urls = outcome.pages.len(), "crawled URLs");
            discovery.urls.extend(outcome.pages);
            discovery.cancelled = outcome.cancelled;
        }

        Ok(discovery)
    }

    /// Fetches and searches `urls` in sorted order.
    ///
    /// Returns the records, how many pages were actually scanned, and whether
    /// the pass was cut short.
    pub async fn scan_urls(
        &self,
        urls: &BTreeSet<String>,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> (Vec<MatchRecord>, usize, bool) {
        let total = urls.len();
        let done = AtomicUsize::new(0);
        let pacer = Pacer::new(self.config.scan_delay());
        let terms = self.config.terms();

        let outcomes: Vec<PageOutcome> = stream::iter(urls.iter())
            .map(|url| {
                let pacer = &pacer;
                let done = &done;
                async move {
                    let outcome = self.scan_page(url, terms, pacer, cancel).await;
                    if !matches!(outcome, PageOutcome::Cancelled) {
                        progress.update(ProgressUpdate {
                            stage: Stage::Scan,
                            current: done.fetch_add(1, Ordering::SeqCst) + 1,
                            total,
                            url: url.clone(),
                        });
                    }
                    outcome
                }
            })
            .buffered(self.config.concurrency())
            .collect()
            .await;

        let mut records = Vec::new();
        let mut scanned = 0;
        let mut cancelled = false;
        for outcome in outcomes {
            match outcome {
                PageOutcome::Scanned(page_records) => {
                    scanned += 1;
                    records.extend(page_records);
                }
                PageOutcome::Unavailable => {}
                PageOutcome::Cancelled => cancelled = true,
            }
        }

        (records, scanned, cancelled)
    }

    async fn scan_page(
        &self,
        url: &str,
        terms: &[String],
        pacer: &Pacer,
        cancel: &CancellationToken,
    ) -> PageOutcome {
        if cancel.is_cancelled() {
            return PageOutcome::Cancelled;
        }

        let html = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PageOutcome::Cancelled,
            html = async {
                pacer.wait().await;
                self.fetcher.fetch_html(url).await
            } => html,
        };

        match html {
            Some(html) => PageOutcome::Scanned(match_page(url, &html, terms)),
            None => PageOutcome::Unavailable,
        }
    }
}

/// Extracts the visible text of one page and turns every hit into a record.
pub fn match_page(url: &str, html: &str, terms: &[String]) -> Vec<MatchRecord> {
    let text = extract_visible_text(html);

    search_terms(&text, terms)
        .into_iter()
        .flat_map(|found| {
            let term = found.term;
            found.snippets.into_iter().map(move |snippet| MatchRecord {
                url: url.to_string(),
                term: term.clone(),
                snippet,
            })
        })
        .collect()
}
