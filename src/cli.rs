// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Three subcommands:
// - scan: the full run (sitemap and/or crawl, then search every page)
// - sitemap: just list the URLs a sitemap resolves to
// - crawl: just list the URLs a crawl reaches
//
// Numeric ranges (max pages, delays, timeout) are checked by ScanConfig, not
// here, so the library and the CLI reject exactly the same values.
// =============================================================================

use brand_scanner::config::{
    DEFAULT_CONCURRENCY, DEFAULT_CRAWL_DELAY, DEFAULT_MAX_PAGES, DEFAULT_SCAN_DELAY,
};
use brand_scanner::fetch::DEFAULT_TIMEOUT_SECS;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "brand-scanner",
    version,
    about = "Scan a website for leftover brand names and placeholder terms",
    long_about = "brand-scanner collects a site's pages from its sitemap and/or by crawling, \
                  then searches the visible text of every page for the terms you give it. \
                  It exits with code 1 when any term is found, so it can gate a deploy."
)]
pub struct Cli {
    /// Show debug logs (RUST_LOG overrides this)
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find terms on every page of a site
    ///
    /// Example: brand-scanner scan https://example.com --term OldBrand --crawl
    Scan(ScanArgs),

    /// List the page URLs a sitemap (or sitemap index) resolves to
    ///
    /// Example: brand-scanner sitemap https://example.com/sitemap.xml
    Sitemap {
        /// Sitemap URL
        sitemap_url: String,

        /// Output JSON instead of one URL per line
        #[arg(long)]
        json: bool,
    },

    /// List the pages a breadth-first crawl reaches
    ///
    /// Example: brand-scanner crawl https://example.com --max-pages 50
    Crawl {
        /// Where to start; only this host is crawled
        start_url: String,

        /// Stop after this many URLs (10-2000)
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: usize,

        /// Seconds between requests (0-1)
        #[arg(long, default_value_t = DEFAULT_CRAWL_DELAY)]
        delay: f64,

        /// Output JSON instead of one URL per line
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Site root, e.g. https://example.com
    pub root_url: String,

    /// Term to search for; repeat for several
    #[arg(short, long = "term", value_name = "TERM")]
    pub terms: Vec<String>,

    /// File with one term per line (blank lines ignored)
    #[arg(long, value_name = "PATH")]
    pub terms_file: Option<PathBuf>,

    /// Don't read the sitemap
    #[arg(long)]
    pub no_sitemap: bool,

    /// Sitemap to read instead of <ROOT_URL>/sitemap.xml
    #[arg(long, value_name = "URL")]
    pub sitemap_url: Option<String>,

    /// Also crawl the site by following links
    #[arg(long)]
    pub crawl: bool,

    /// Crawl budget in URLs (10-2000)
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Seconds between crawl requests (0-1)
    #[arg(long, default_value_t = DEFAULT_CRAWL_DELAY)]
    pub delay: f64,

    /// Seconds between scan requests
    #[arg(long, default_value_t = DEFAULT_SCAN_DELAY)]
    pub scan_delay: f64,

    /// Pages fetched at once during the scan
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS as f64)]
    pub timeout: f64,

    /// User-Agent header to send
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Output JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Also write the matches to this CSV file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_arguments() {
        let cli = Cli::try_parse_from([
            "brand-scanner",
            "scan",
            "https://example.com",
            "-t",
            "OldBrand",
            "--term",
            "Template",
            "--crawl",
            "--max-pages",
            "50",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.terms, vec!["OldBrand", "Template"]);
        assert!(args.crawl);
        assert!(!args.no_sitemap);
        assert_eq!(args.max_pages, 50);
        assert_eq!(args.delay, DEFAULT_CRAWL_DELAY);
        assert_eq!(args.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_crawl_defaults() {
        let cli = Cli::try_parse_from(["brand-scanner", "crawl", "https://example.com"]).unwrap();
        match cli.command {
            Commands::Crawl {
                max_pages, json, ..
            } => {
                assert_eq!(max_pages, DEFAULT_MAX_PAGES);
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
