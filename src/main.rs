//! # AI News Digest
//!
//! Scrapes AI-related news from a small registry of RSS feeds and HTML listing
//! pages, normalizes every item into one article record with a heuristic
//! summary and topic labels, and writes the result as a JSON array for a
//! dashboard to read.
//!
//! ## Usage
//!
//! ```sh
//! ai_news_digest -o data/articles.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Sources**: built-in registry, or a YAML file passed with `--sources`
//! 2. **Ingestion**: RSS feeds are parsed directly; HTML listings are walked
//!    with per-source selectors and each article page is scraped
//! 3. **Normalization**: summary, topics, clipped content, synthetic recency
//! 4. **Output**: one JSON array, registry order, replaced on every run

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod heuristics;
mod http;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod sources;
mod utils;

use cli::Cli;
use http::{DEFAULT_USER_AGENT, HttpFetcher, RetryFetch};
use outputs::json;
use pipeline::{Pipeline, PipelineConfig};
use utils::ensure_writable_dir;

/// Base delay for the retry layer; doubles per attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ai_news_digest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Source registry ----
    let sources = match &args.sources {
        Some(path) => match sources::load_sources(path).await {
            Ok(sources) => sources,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load sources file");
                return Err(e.into());
            }
        },
        None => sources::default_sources().to_vec(),
    };
    info!(count = sources.len(), "Source registry ready");

    // Early check: a run that cannot save its output is not worth scraping for.
    let output_dir = args
        .output
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Scrape ----
    let user_agent = args.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    let fetcher = RetryFetch::new(
        HttpFetcher::new(user_agent, Duration::from_secs(args.timeout_secs))?,
        args.max_retries,
        RETRY_BASE_DELAY,
    );
    let config = PipelineConfig {
        max_items: args.max_items,
        item_delay: Duration::from_millis(args.delay_ms),
        concurrency: args.concurrency,
        use_feed_dates: args.feed_dates,
    };
    let pipeline = Pipeline::new(fetcher, config);

    let report = pipeline.run(&sources).await;
    for source in &report.sources {
        match &source.error {
            Some(e) => warn!(source = %source.source, error = %e, "Source produced no articles"),
            None => info!(
                source = %source.source,
                articles = source.articles.len(),
                skipped = source.skipped.len(),
                "Source summary"
            ),
        }
    }

    // ---- Output ----
    let articles = report.into_articles();
    info!(count = articles.len(), "Total articles scraped");
    if let Err(e) = json::write_articles(&articles, &args.output).await {
        error!(path = %args.output.display(), error = %e, "Failed to write articles JSON");
        return Err(e);
    }
    info!(path = %args.output.display(), count = articles.len(), "Saved articles");

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
