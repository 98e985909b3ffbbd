// src/crawl/filter.rs
// =============================================================================
// Pure URL predicates used while discovering pages.
//
// - is_internal: does this URL belong to the site we are scanning?
// - should_skip: is this URL an asset, an admin page or a non-web scheme?
//
// Both are plain functions with no I/O, so the crawler and the tests can
// call them freely.
// =============================================================================

use url::{ParseError, Url};

/// Substrings that mark a URL as not worth fetching.
///
/// Matched anywhere in the lowercased URL, so "/feed.json" is skipped too
/// (it contains ".js"). Callers rely on that exact behaviour.
pub const SKIP_PATTERNS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".css", ".js", ".ico",
    "/wp-admin", "/wp-login", "mailto:", "tel:",
];

/// Returns `host[:port]` for a URL, or `None` when it has no host.
///
/// This is the string compared against the crawl's root domain. The port is
/// only present when it differs from the scheme's default.
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// True if `url` has no host (relative links, `mailto:` and friends) or its
/// authority is exactly `root_domain`.
///
/// No subdomain matching: `www.example.com` and `example.com` are different
/// sites.
pub fn is_internal(url: &str, root_domain: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => authority(&parsed).map_or(true, |a| a == root_domain),
        // "//host/path" is relative in scheme only, it still names a host
        Err(ParseError::RelativeUrlWithoutBase) if url.starts_with("//") => {
            match Url::parse(&format!("http:{}", url)) {
                Ok(parsed) => authority(&parsed).map_or(true, |a| a == root_domain),
                Err(_) => false,
            }
        }
        Err(ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

pub fn should_skip(url: &str) -> bool {
    let lower = url.to_lowercase();
    SKIP_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}
