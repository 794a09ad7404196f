//! Command-line interface definitions for AI News Digest.
//!
//! All options can be provided via command-line flags or environment variables.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the AI News Digest scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape the built-in sources into data/articles.json
/// ai_news_digest
///
/// # Custom source list and output path, no throttle
/// ai_news_digest -s sources.yaml -o /srv/dashboard/articles.json --delay-ms 0
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the JSON file to write
    #[arg(
        short,
        long,
        env = "AI_NEWS_OUTPUT",
        default_value = "data/articles.json"
    )]
    pub output: PathBuf,

    /// Optional YAML file replacing the built-in source list
    #[arg(short, long, env = "AI_NEWS_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Pause after each produced article, in milliseconds
    #[arg(long, env = "AI_NEWS_DELAY_MS", default_value_t = 1000)]
    pub delay_ms: u64,

    /// Articles kept per source
    #[arg(long, env = "AI_NEWS_MAX_ITEMS", default_value_t = 5)]
    pub max_items: usize,

    /// Sources scraped at the same time
    #[arg(long, env = "AI_NEWS_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// Retries for transient HTTP failures (0 disables retrying)
    #[arg(long, env = "AI_NEWS_MAX_RETRIES", default_value_t = 2)]
    pub max_retries: usize,

    /// Per-request timeout, in seconds
    #[arg(long, env = "AI_NEWS_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Override the browser-like User-Agent header
    #[arg(long, env = "AI_NEWS_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Use feed publish dates instead of synthetic recency offsets
    #[arg(long, env = "AI_NEWS_FEED_DATES")]
    pub feed_dates: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["ai_news_digest"]);

        assert_eq!(cli.output, PathBuf::from("data/articles.json"));
        assert_eq!(cli.sources, None);
        assert_eq!(cli.delay_ms, 1000);
        assert_eq!(cli.max_items, 5);
        assert_eq!(cli.concurrency, 1);
        assert_eq!(cli.max_retries, 2);
        assert_eq!(cli.timeout_secs, 30);
        assert_eq!(cli.user_agent, None);
        assert!(!cli.feed_dates);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "ai_news_digest",
            "-o",
            "/tmp/out.json",
            "-s",
            "/tmp/sources.yaml",
        ]);

        assert_eq!(cli.output, PathBuf::from("/tmp/out.json"));
        assert_eq!(cli.sources, Some(PathBuf::from("/tmp/sources.yaml")));
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "ai_news_digest",
            "--delay-ms",
            "0",
            "--max-items",
            "10",
            "--concurrency",
            "4",
            "--max-retries",
            "0",
            "--timeout-secs",
            "5",
            "--user-agent",
            "digest-bot/1.0",
            "--feed-dates",
        ]);

        assert_eq!(cli.delay_ms, 0);
        assert_eq!(cli.max_items, 10);
        assert_eq!(cli.concurrency, 4);
        assert_eq!(cli.max_retries, 0);
        assert_eq!(cli.timeout_secs, 5);
        assert_eq!(cli.user_agent.as_deref(), Some("digest-bot/1.0"));
        assert!(cli.feed_dates);
    }

    #[test]
    fn test_cli_rejects_non_numeric_delay() {
        let parsed = Cli::try_parse_from(["ai_news_digest", "--delay-ms", "soon"]);
        assert!(parsed.is_err());
    }
}
