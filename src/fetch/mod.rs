// src/fetch/mod.rs
// =============================================================================
// This module is the only place that talks to the network.
//
// Submodules:
// - http: a single GET with timeout, status and content-type checks
// - pacer: a shared "minimum gap between requests" limiter
//
// Everything else in the crate asks the Fetcher for a page and gets back
// either the HTML or nothing. Transport problems never bubble up as errors
// during crawling or scanning, they just mean one page fewer.
// =============================================================================

mod http;
mod pacer;

pub use http::{FetchOptions, Fetcher, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use pacer::Pacer;
