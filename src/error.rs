// src/error.rs
// =============================================================================
// Error types for the scanning library.
//
// The library never panics or aborts a run because of a bad page. Errors only
// show up in three places:
// - ConfigError: the scan was set up wrong, so nothing is fetched at all
// - FetchError: one request failed (callers usually turn this into "absent")
// - SitemapError: one sitemap document could not be read (becomes a warning)
//
// The binary wraps all of these in anyhow::Error, the library stays typed.
// =============================================================================

use thiserror::Error;

/// Problems with the scan settings, detected before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("site root URL must not be empty")]
    EmptyRootUrl,

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("at least one search term is required")]
    NoTerms,

    #[error("enable the sitemap, the crawler, or both")]
    NoUrlSource,

    #[error("max pages must be between {min} and {max}, got {value}")]
    MaxPagesOutOfRange { value: usize, min: usize, max: usize },

    #[error("{name} must be between {min} and {max} seconds, got {value}")]
    DurationOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Why a single request produced nothing.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("not an HTML page ({content_type}): {url}")]
    NotHtml { url: String, content_type: String },
}

/// Failure to read one sitemap document.
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
}
