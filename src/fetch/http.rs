// src/fetch/http.rs
// =============================================================================
// Fetches pages and sitemap documents over HTTP.
//
// Two flavours:
// - fetch_html: the page fetch used by the crawler and the scan pass.
//   Succeeds only on status 200 with a text/html content type. Any other
//   outcome (404, redirect loop, PDF, timeout, DNS failure...) is None.
// - fetch_document: the sitemap fetch. Accepts any 2xx response regardless
//   of content type, and reports failures as FetchError so the sitemap
//   resolver can turn them into warnings.
//
// No retries. A page that fails once is simply not scanned.
// =============================================================================

use crate::error::FetchError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Identifies the scanner to the sites it visits.
pub const DEFAULT_USER_AGENT: &str = "BrandScannerBot/1.0 (+https://example.com)";

/// Settings for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// Cheap to clone: reqwest::Client is a reference-counted handle, so every
// clone shares one connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(options: &FetchOptions) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    /// Fetches an HTML page, or returns `None` on any failure.
    pub async fn fetch_html(&self, url: &str) -> Option<String> {
        match self.try_fetch_html(url).await {
            Ok(html) => Some(html),
            Err(e) => {
                debug!(url, error = %e, "page fetch failed");
                None
            }
        }
    }

    async fn try_fetch_html(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching page");
        let response = self.client.get(url).send().await?;

        // Exactly 200. A 204 or 206 is not a page we can scan.
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        Ok(response.text().await?)
    }

    /// Fetches any document (used for sitemap XML). Any 2xx status counts.
    pub async fn fetch_document(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching document");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        Ok(response.text().await?)
    }
}
