// src/config.rs
// =============================================================================
// Settings for one scan run, validated up front.
//
// A ScanConfig can only be built through ScanConfig::new and the with_*
// methods, each of which rejects bad input with a ConfigError. So by the time
// the Scanner gets a config, the root URL parses, there is at least one
// non-blank term, and every number is inside its allowed range. Nothing
// touches the network before that.
//
// There is no config file and no environment variables; the CLI fills this
// in from its arguments.
// =============================================================================

use crate::error::ConfigError;
use crate::fetch::FetchOptions;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MAX_PAGES: usize = 200;
pub const MIN_MAX_PAGES: usize = 10;
pub const MAX_MAX_PAGES: usize = 2000;

/// Seconds between crawl requests.
pub const DEFAULT_CRAWL_DELAY: f64 = 0.2;
pub const MAX_CRAWL_DELAY: f64 = 1.0;

/// Seconds between scan-pass requests.
pub const DEFAULT_SCAN_DELAY: f64 = 0.1;
pub const MAX_SCAN_DELAY: f64 = 10.0;

pub const DEFAULT_CONCURRENCY: usize = 4;

pub const MAX_TIMEOUT_SECS: f64 = 300.0;

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub max_pages: usize,
    pub delay: Duration,
}

impl CrawlSettings {
    pub fn new(max_pages: usize, delay_secs: f64) -> Result<Self, ConfigError> {
        if !(MIN_MAX_PAGES..=MAX_MAX_PAGES).contains(&max_pages) {
            return Err(ConfigError::MaxPagesOutOfRange {
                value: max_pages,
                min: MIN_MAX_PAGES,
                max: MAX_MAX_PAGES,
            });
        }
        Ok(Self {
            max_pages,
            delay: seconds("crawl delay", delay_secs, 0.0, MAX_CRAWL_DELAY)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    root_url: String,
    terms: Vec<String>,
    use_sitemap: bool,
    sitemap_url: Option<String>,
    crawl: Option<CrawlSettings>,
    scan_delay: Duration,
    concurrency: usize,
    fetch: FetchOptions,
}

impl ScanConfig {
    /// Sitemap on, crawler off, default delays.
    ///
    /// Terms are trimmed; blank ones are dropped and exact duplicates are
    /// kept only once, in first-seen order.
    pub fn new<I, S>(root_url: &str, terms: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let root_url = root_url.trim();
        if root_url.is_empty() {
            return Err(ConfigError::EmptyRootUrl);
        }
        let parsed = Url::parse(root_url).map_err(|source| ConfigError::InvalidUrl {
            url: root_url.to_string(),
            source,
        })?;
        if parsed.host_str().is_none() {
            return Err(ConfigError::MissingHost(root_url.to_string()));
        }

        let mut unique: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim();
            if !term.is_empty() && !unique.iter().any(|t| t == term) {
                unique.push(term.to_string());
            }
        }
        if unique.is_empty() {
            return Err(ConfigError::NoTerms);
        }

        Ok(Self {
            root_url: root_url.to_string(),
            terms: unique,
            use_sitemap: true,
            sitemap_url: None,
            crawl: None,
            scan_delay: Duration::from_secs_f64(DEFAULT_SCAN_DELAY),
            concurrency: DEFAULT_CONCURRENCY,
            fetch: FetchOptions::default(),
        })
    }

    /// Uses `url` instead of `<root>/sitemap.xml`. Blank means the default.
    pub fn with_sitemap_url(mut self, url: Option<&str>) -> Self {
        self.sitemap_url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        self
    }

    pub fn without_sitemap(mut self) -> Self {
        self.use_sitemap = false;
        self
    }

    pub fn with_crawl(mut self, max_pages: usize, delay_secs: f64) -> Result<Self, ConfigError> {
        self.crawl = Some(CrawlSettings::new(max_pages, delay_secs)?);
        Ok(self)
    }

    pub fn with_scan_delay(mut self, delay_secs: f64) -> Result<Self, ConfigError> {
        self.scan_delay = seconds("scan delay", delay_secs, 0.0, MAX_SCAN_DELAY)?;
        Ok(self)
    }

    pub fn with_concurrency(mut self, workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        self.concurrency = workers;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout_secs: f64) -> Result<Self, ConfigError> {
        let timeout = seconds("timeout", timeout_secs, 0.0, MAX_TIMEOUT_SECS)?;
        if timeout.is_zero() {
            return Err(ConfigError::DurationOutOfRange {
                name: "timeout",
                value: timeout_secs,
                min: 0.0,
                max: MAX_TIMEOUT_SECS,
            });
        }
        self.fetch.timeout = timeout;
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        let user_agent = user_agent.trim();
        if !user_agent.is_empty() {
            self.fetch.user_agent = user_agent.to_string();
        }
        self
    }

    /// Final check before a run: at least one URL source must be on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.use_sitemap && self.crawl.is_none() {
            return Err(ConfigError::NoUrlSource);
        }
        Ok(())
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// The sitemap to read, or `None` when the sitemap is disabled.
    pub fn sitemap_url(&self) -> Option<String> {
        if !self.use_sitemap {
            return None;
        }
        Some(
            self.sitemap_url
                .clone()
                .unwrap_or_else(|| default_sitemap_url(&self.root_url)),
        )
    }

    pub fn crawl(&self) -> Option<&CrawlSettings> {
        self.crawl.as_ref()
    }

    pub fn scan_delay(&self) -> Duration {
        self.scan_delay
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn fetch_options(&self) -> &FetchOptions {
        &self.fetch
    }
}

/// `<root>/sitemap.xml`, without doubling the slash.
pub fn default_sitemap_url(root_url: &str) -> String {
    format!("{}/sitemap.xml", root_url.trim_end_matches('/'))
}

// Converts user-supplied seconds to a Duration. NaN and negatives fail the
// range check, so from_secs_f64 never panics.
fn seconds(name: &'static str, value: f64, min: f64, max: f64) -> Result<Duration, ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::DurationOutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(Duration::from_secs_f64(value))
}
