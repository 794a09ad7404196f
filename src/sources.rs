//! Source registry.
//!
//! The compiled-in defaults cover the four AI news sources the dashboard was
//! built around. A YAML file with the same shape can replace them at startup:
//!
//! ```yaml
//! - name: Anthropic
//!   type: html
//!   url: https://www.anthropic.com/news
//!   base_url: https://www.anthropic.com
//!   selectors:
//!     item: "li, article"
//!     title: "h3, h2"
//!     link: a
//! - name: Wired AI
//!   type: rss
//!   url: https://www.wired.com/feed/tag/ai/latest/rss
//!   base_url: https://www.wired.com
//! ```

use crate::error::ConfigError;
use crate::models::{FetchType, SourceConfig};
use crate::scrapers::listing::ListingSelectors;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument};

static DEFAULT_SOURCES: Lazy<Vec<SourceConfig>> = Lazy::new(|| {
    vec![
        SourceConfig::html(
            "Anthropic",
            "https://www.anthropic.com/news",
            "https://www.anthropic.com",
            "li, article",
            "h3, h2",
            "a",
        ),
        SourceConfig::html(
            "Google AI",
            "https://blog.google/technology/ai/",
            "https://blog.google",
            "article",
            "h3, h2",
            "a",
        ),
        SourceConfig::rss(
            "Wired AI",
            "https://www.wired.com/feed/tag/ai/latest/rss",
            "https://www.wired.com",
        ),
        SourceConfig::rss(
            "AI Blog",
            "https://www.artificial-intelligence.blog/ai-news?format=rss",
            "https://www.artificial-intelligence.blog",
        ),
    ]
});

/// The compiled-in source registry, in scrape order.
pub fn default_sources() -> &'static [SourceConfig] {
    &DEFAULT_SOURCES
}

/// Check registry invariants: non-empty, unique names, URLs present, and
/// every HTML selector parses.
pub fn validate(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::Empty);
    }
    let mut seen = HashSet::new();
    for source in sources {
        if !seen.insert(source.name.as_str()) {
            return Err(ConfigError::DuplicateName(source.name.clone()));
        }
        if source.url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl(source.name.clone()));
        }
        if let FetchType::Html { selectors } = &source.fetch_type {
            ListingSelectors::parse(selectors).map_err(|e| ConfigError::Selector {
                name: source.name.clone(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Parse and validate a YAML source list.
pub fn parse_sources(yaml: &str) -> Result<Vec<SourceConfig>, ConfigError> {
    let sources: Vec<SourceConfig> = serde_yaml::from_str(yaml)?;
    validate(&sources)?;
    Ok(sources)
}

/// Load the registry from a YAML file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_sources(path: &Path) -> Result<Vec<SourceConfig>, ConfigError> {
    let yaml = tokio::fs::read_to_string(path).await?;
    let sources = parse_sources(&yaml)?;
    info!(count = sources.len(), "Loaded sources file");
    Ok(sources)
}
