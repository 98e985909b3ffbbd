// src/crawl/queue.rs
// =============================================================================
// Breadth-first website crawling with a page budget.
//
// How it works:
// 1. Start with the initial URL in a FIFO queue (the frontier)
// 2. Pop the oldest URL; skip it if we have already seen it
// 3. Mark it seen. That spends one unit of the page budget, even if the
//    page turns out to be an asset or fails to load
// 4. Fetch it; on success record it and queue its same-site links
// 5. Repeat until the queue is empty or max_pages URLs have been seen
//
// Politeness:
// - Every fetch goes through a Pacer, so `delay` is the minimum gap between
//   two requests
// - Only the start URL's host (and port) is crawled
//
// Rust concepts:
// - VecDeque: FIFO queue, push_back/pop_front gives breadth-first order
// - HashSet: O(1) "have we seen this URL?" checks
// - BTreeSet: the result set, kept sorted so output is stable
// =============================================================================

use super::filter::{authority, should_skip};
use super::links::{extract_internal_links, strip_fragment};
use crate::error::ConfigError;
use crate::fetch::{Fetcher, Pacer};
use crate::progress::{ProgressSink, ProgressUpdate, Stage};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

/// Queue of pending URLs plus everything already pulled off it.
///
/// Owned by exactly one crawl; nothing else reads or writes it.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new(start_url: String) -> Self {
        let mut frontier = Self::default();
        frontier.queue.push_back(start_url);
        frontier
    }

    /// Pops the next URL that has not been seen yet and marks it seen.
    ///
    /// Duplicates sitting in the queue are discarded here without costing
    /// any budget.
    pub fn next_unseen(&mut self) -> Option<String> {
        while let Some(url) = self.queue.pop_front() {
            if self.seen.insert(url.clone()) {
                return Some(url);
            }
        }
        None
    }

    pub fn push(&mut self, url: String) {
        self.queue.push_back(url);
    }

    pub fn is_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// Result of one crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Pages that were fetched successfully.
    pub pages: BTreeSet<String>,
    /// URLs that consumed budget (fetched, failed or skipped).
    pub seen: usize,
    /// True if the crawl stopped because it was cancelled.
    pub cancelled: bool,
}

pub struct Crawler {
    fetcher: Fetcher,
    max_pages: usize,
    pacer: Pacer,
}

impl Crawler {
    pub fn new(fetcher: Fetcher, max_pages: usize, delay: Duration) -> Self {
        Self {
            fetcher,
            max_pages,
            pacer: Pacer::new(delay),
        }
    }

    /// Crawls the site starting at `start_url`.
    ///
    /// Only fails if `start_url` cannot be parsed or has no host. Pages that
    /// fail to load just don't appear in the result.
    pub async fn crawl(
        &self,
        start_url: &str,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome, ConfigError> {
        let start = Url::parse(start_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            url: start_url.to_string(),
            source,
        })?;

        // The domain is fixed for the whole crawl.
        let root_domain =
            authority(&start).ok_or_else(|| ConfigError::MissingHost(start_url.to_string()))?;
        let start = strip_fragment(start);

        info!(start = %start, max_pages = self.max_pages, "crawling");

        let mut frontier = Frontier::new(start.to_string());
        let mut outcome = CrawlOutcome::default();

        while frontier.seen_count() < self.max_pages {
            let Some(current) = frontier.next_unseen() else {
                break;
            };

            progress.update(ProgressUpdate {
                stage: Stage::Crawl,
                current: frontier.seen_count(),
                total: self.max_pages,
                url: current.clone(),
            });

            if should_skip(&current) {
                debug!(url = %current, "skipping excluded URL");
                continue;
            }

            let Some(html) = self.paced_fetch(&current, cancel).await else {
                if cancel.is_cancelled() {
                    outcome.cancelled = true;
                    break;
                }
                continue;
            };

            // `current` came from a parsed Url (the start) or from
            // extract_internal_links, so it always parses again.
            let Ok(page_url) = Url::parse(&current) else {
                continue;
            };

            for link in extract_internal_links(&html, &page_url, &root_domain) {
                if !frontier.is_seen(&link) && !should_skip(&link) {
                    frontier.push(link);
                }
            }

            outcome.pages.insert(current);
        }

        outcome.seen = frontier.seen_count();
        info!(
            pages = outcome.pages.len(),
            seen = outcome.seen,
            "crawl finished"
        );

        Ok(outcome)
    }

    // Waits for the pacer, then fetches. Gives up as soon as the run is
    // cancelled, even mid-request.
    async fn paced_fetch(&self, url: &str, cancel: &CancellationToken) -> Option<String> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            html = async {
                self.pacer.wait().await;
                self.fetcher.fetch_html(url).await
            } => html,
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why does a failed or skipped URL still count against max_pages?
//    - The budget bounds how many URLs we pull off the queue, not how many
//      pages we manage to load. That keeps the loop finite on sites full of
//      broken links or asset URLs.
//
// 2. Why can the queue hold duplicates?
//    - A link is only checked against the seen-set when it is queued. Two
//      pages linking to the same URL queue it twice; next_unseen() drops the
//      second copy for free.
//
// 3. What is `let ... else`?
//    - Pattern match that must succeed, otherwise the else block runs and
//      has to leave the scope (break, continue, return)
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchOptions;
    use crate::progress::Silent;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn page(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8"),
            )
            .mount(server)
            .await;
    }

    fn crawler(max_pages: usize) -> Crawler {
        let fetcher = Fetcher::new(&FetchOptions::default()).unwrap();
        Crawler::new(fetcher, max_pages, Duration::ZERO)
    }

    #[test]
    fn test_frontier_discards_duplicates_without_budget() {
        let mut frontier = Frontier::new("a".to_string());
        frontier.push("b".to_string());
        frontier.push("a".to_string());
        frontier.push("b".to_string());

        assert_eq!(frontier.next_unseen().as_deref(), Some("a"));
        assert_eq!(frontier.next_unseen().as_deref(), Some("b"));
        assert_eq!(frontier.next_unseen(), None);
        assert_eq!(frontier.seen_count(), 2);
    }

    #[tokio::test]
    async fn test_breadth_first_over_site() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
        page(&server, "/a", r#"<a href="/c">C</a><a href="/">Home</a>"#).await;
        page(&server, "/b", "<p>no links</p>").await;
        page(&server, "/c", "<p>leaf</p>").await;

        let order = Mutex::new(Vec::new());
        let sink = |update: ProgressUpdate| order.lock().unwrap().push(update.url);

        let outcome = crawler(50)
            .crawl(&server.uri(), &sink, &CancellationToken::new())
            .await
            .unwrap();

        let base = server.uri();
        let expected: BTreeSet<String> = ["/", "/a", "/b", "/c"]
            .iter()
            .map(|p| format!("{}{}", base, p))
            .collect();
        assert_eq!(outcome.pages, expected);

        // Visit order is breadth-first: root, then its children, then /c
        let visited = order.lock().unwrap().clone();
        let paths: Vec<_> = visited.iter().map(|u| u.trim_start_matches(&base)).collect();
        assert_eq!(paths, vec!["/", "/a", "/b", "/c"]);
    }

    #[tokio::test]
    async fn test_budget_bounds_visits_on_cycles() {
        let server = MockServer::start().await;
        // Every page links to two more, forever: /n -> /n0, /n1
        Mock::given(method("GET"))
            .respond_with(|req: &wiremock::Request| {
                let p = req.url.path().trim_end_matches('/');
                let body = format!(r#"<a href="{p}/0">0</a><a href="{p}/1">1</a><a href="/">home</a>"#);
                ResponseTemplate::new(200).set_body_raw(body, "text/html")
            })
            .mount(&server)
            .await;

        for max_pages in [1, 5, 12] {
            let outcome = crawler(max_pages)
                .crawl(&server.uri(), &Silent, &CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(outcome.seen, max_pages);
            assert!(outcome.pages.len() <= max_pages);
        }
    }

    #[tokio::test]
    async fn test_never_leaves_the_domain() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            r#"<a href="https://example.org/">Elsewhere</a><a href="/local">Local</a>"#,
        )
        .await;
        page(&server, "/local", "<p>hi</p>").await;

        let outcome = crawler(20)
            .crawl(&server.uri(), &Silent, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.pages.len(), 2);
        assert!(outcome.pages.iter().all(|u| u.starts_with(&server.uri())));
    }

    #[tokio::test]
    async fn test_skipped_and_failed_urls_spend_budget_but_are_not_results() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            r#"<a href="/missing">Missing</a><a href="/logo.png">Logo</a><a href="/ok">Ok</a>"#,
        )
        .await;
        page(&server, "/ok", "<p>ok</p>").await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcome = crawler(20)
            .crawl(&server.uri(), &Silent, &CancellationToken::new())
            .await
            .unwrap();

        let base = server.uri();
        assert_eq!(
            outcome.pages,
            BTreeSet::from([format!("{}/", base), format!("{}/ok", base)])
        );
        // "/", "/missing", "/ok"; the .png never made it into the frontier
        assert_eq!(outcome.seen, 3);
    }

    #[tokio::test]
    async fn test_same_result_on_repeat_runs() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/x#top">X</a><a href="/y">Y</a>"#).await;
        page(&server, "/x", r#"<a href="/y">Y</a>"#).await;
        page(&server, "/y", r#"<a href="/x">X</a>"#).await;

        let first = crawler(10)
            .crawl(&server.uri(), &Silent, &CancellationToken::new())
            .await
            .unwrap();
        let second = crawler(10)
            .crawl(&server.uri(), &Silent, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(first.pages, second.pages);
        assert_eq!(first.pages.len(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_crawl_returns_partial_result() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/a">A</a>"#).await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = crawler(10)
            .crawl(&server.uri(), &Silent, &cancel)
            .await
            .unwrap();

        assert!(outcome.cancelled);
        assert!(outcome.pages.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_first_page_keeps_it() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>a</p>", "text/html"))
            .expect(0)
            .mount(&server)
            .await;

        // Progress fires when a URL is dequeued, so current == 2 means the
        // root page has already been fetched.
        let cancel = CancellationToken::new();
        let sink = |update: ProgressUpdate| {
            if update.current == 2 {
                cancel.cancel();
            }
        };

        let outcome = crawler(10).crawl(&server.uri(), &sink, &cancel).await.unwrap();

        assert!(outcome.cancelled);
        assert_eq!(
            outcome.pages,
            BTreeSet::from([format!("{}/", server.uri())])
        );
    }

    #[tokio::test]
    async fn test_invalid_start_url() {
        let result = crawler(10)
            .crawl("not a url", &Silent, &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }
}
