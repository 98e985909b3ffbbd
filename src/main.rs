// src/main.rs
// =============================================================================
// This is the entry point of the brand-scanner CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so --json output on stdout stays clean)
// 3. Install a ctrl-c handler that cancels the run instead of killing it
// 4. Dispatch to the subcommand handler and print the results
// 5. Exit with proper code (0 = no matches, 1 = matches found, 2 = error)
//
// Rust concepts used:
// - async/await: the library fetches pages asynchronously
// - anyhow::Result: any library error bubbles up with `?` and becomes exit 2
// - CancellationToken: a shared flag the library checks between requests
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use brand_scanner::config::CrawlSettings;
use brand_scanner::crawl::{Crawler, SitemapResolver};
use brand_scanner::fetch::{FetchOptions, Fetcher};
use brand_scanner::progress::TerminalProgress;
use brand_scanner::{report, ScanConfig, Scanner};
use clap::Parser;
use cli::{Cli, Commands, ScanArgs};
use serde_json::json;
use std::io;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // `{:#}` prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no term found
//   Ok(1) = at least one term found
//   Err   = bad arguments or I/O failure (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping with partial results");
            on_ctrl_c.cancel();
        }
    });

    match cli.command {
        Commands::Scan(args) => handle_scan(args, &cancel).await,
        Commands::Sitemap { sitemap_url, json } => {
            handle_sitemap(&sitemap_url, json, &cancel).await
        }
        Commands::Crawl {
            start_url,
            max_pages,
            delay,
            json,
        } => handle_crawl(&start_url, max_pages, delay, json, &cancel).await,
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

// Handles the 'scan' subcommand
async fn handle_scan(args: ScanArgs, cancel: &CancellationToken) -> Result<i32> {
    let mut terms = args.terms;
    if let Some(path) = &args.terms_file {
        terms.extend(read_terms_file(path)?);
    }

    let mut config = ScanConfig::new(&args.root_url, &terms)?
        .with_sitemap_url(args.sitemap_url.as_deref())
        .with_scan_delay(args.scan_delay)?
        .with_concurrency(args.concurrency)?
        .with_timeout(args.timeout)?;
    if args.no_sitemap {
        config = config.without_sitemap();
    }
    if args.crawl {
        config = config.with_crawl(args.max_pages, args.delay)?;
    }
    if let Some(user_agent) = &args.user_agent {
        config = config.with_user_agent(user_agent);
    }

    let scanner = Scanner::new(config)?;
    info!(
        root = scanner.config().root_url(),
        terms = scanner.config().terms().len(),
        "starting scan"
    );

    let progress = TerminalProgress::new();
    let result = scanner.run(&progress, cancel).await;
    progress.finish();
    let report = result?;

    if let Some(path) = &args.csv {
        report::export_csv(path, &report.records)
            .with_context(|| format!("failed to write CSV to {}", path.display()))?;
        info!(path = %path.display(), records = report.records.len(), "wrote CSV");
    }

    if args.json {
        println!("{}", report::to_json(&report)?);
    } else {
        report::write_table(&mut io::stdout().lock(), &report)?;
    }

    if report.has_matches() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Handles the 'sitemap' subcommand
async fn handle_sitemap(sitemap_url: &str, json: bool, cancel: &CancellationToken) -> Result<i32> {
    let fetcher = Fetcher::new(&FetchOptions::default())?;

    let progress = TerminalProgress::new();
    let resolution = SitemapResolver::new(&fetcher)
        .resolve(sitemap_url, &progress, cancel)
        .await;
    progress.finish();

    if json {
        let output = json!({
            "urls": resolution.urls,
            "sitemaps_read": resolution.sitemaps_read,
            "warnings": resolution.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for url in &resolution.urls {
            println!("{}", url);
        }
        for warning in &resolution.warnings {
            eprintln!("⚠️  {}", warning);
        }
        eprintln!(
            "📄 {} URL(s) from {} sitemap(s)",
            resolution.urls.len(),
            resolution.sitemaps_read
        );
    }

    Ok(0)
}

// Handles the 'crawl' subcommand
async fn handle_crawl(
    start_url: &str,
    max_pages: usize,
    delay: f64,
    json: bool,
    cancel: &CancellationToken,
) -> Result<i32> {
    let settings = CrawlSettings::new(max_pages, delay)?;
    let fetcher = Fetcher::new(&FetchOptions::default())?;
    let crawler = Crawler::new(fetcher, settings.max_pages, settings.delay);

    let progress = TerminalProgress::new();
    let result = crawler.crawl(start_url, &progress, cancel).await;
    progress.finish();
    let outcome = result?;

    if json {
        let output = json!({
            "pages": outcome.pages,
            "seen": outcome.seen,
            "cancelled": outcome.cancelled,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for page in &outcome.pages {
            println!("{}", page);
        }
        eprintln!(
            "📄 Crawled {} page(s), {} URL(s) visited",
            outcome.pages.len(),
            outcome.seen
        );
    }

    Ok(0)
}

// One term per line; surrounding whitespace and blank lines are dropped
// later by ScanConfig.
fn read_terms_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read terms file {}", path.display()))?;
    Ok(content.lines().map(str::to_string).collect())
}
