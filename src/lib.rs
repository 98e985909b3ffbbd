// src/lib.rs
// =============================================================================
// The scanning engine behind the brand-scanner CLI.
//
// A scan has three passes:
// 1. sitemap: read sitemap.xml (following nested indexes) for page URLs
// 2. crawl: breadth-first walk of same-site links, bounded by a page budget
// 3. scan: fetch every URL found, extract its visible text and search it
//    case-insensitively for each term, keeping a snippet around every hit
//
// Modules:
// - config: validated settings for one run
// - fetch: the HTTP client and the request pacer
// - crawl: sitemap resolution, link extraction and the crawler
// - scan: text extraction, term matching and the scan pipeline
// - report: table / JSON / CSV rendering of a ScanReport
// - progress: the callback interface used to show progress
// - error: typed errors
//
// Typical use:
//
//     let config = ScanConfig::new("https://example.com", ["OldBrand"])?
//         .with_crawl(200, 0.2)?;
//     let report = Scanner::new(config)?
//         .run(&Silent, &CancellationToken::new())
//         .await?;
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod progress;
pub mod report;
pub mod scan;

pub use config::ScanConfig;
pub use error::{ConfigError, FetchError, SitemapError};
pub use progress::{ProgressSink, ProgressUpdate, Silent, Stage};
pub use scan::{MatchRecord, ScanReport, Scanner};
