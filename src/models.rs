//! Data models for sources, scraped items, and normalized articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SourceConfig`]: One configured origin of articles (an RSS feed or an HTML listing)
//! - [`RawItem`]: An unprocessed item pulled from a feed or a listing page
//! - [`ScrapedPage`]: Best-effort body text and image extracted from an article page
//! - [`Article`]: The normalized record written to the output file
//!
//! `Article` serializes with camelCase field names to match the JSON consumed
//! by the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One configured news source.
///
/// Sources are constructed once at startup (compiled-in defaults or a YAML
/// file) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Unique display name, copied into [`Article::source`].
    pub name: String,
    /// Feed or listing page address.
    pub url: String,
    /// Prefix used to absolutize links that start with `/`.
    pub base_url: String,
    /// How the source is fetched; HTML sources carry their selectors.
    #[serde(flatten)]
    pub fetch_type: FetchType,
}

/// The ingestion path for a source.
///
/// Selectors only exist on the `Html` variant, so an RSS source can never
/// carry them and an HTML source can never lack them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FetchType {
    Rss,
    Html { selectors: Selectors },
}

/// CSS selector groups used to pick articles out of an HTML listing.
///
/// Each value may list several candidates, e.g. `"h3, h2"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Selectors {
    /// Matches each article container on the listing page.
    pub item: String,
    /// Matches the title element inside a container.
    pub title: String,
    /// Matches the anchor inside a container.
    pub link: String,
}

impl SourceConfig {
    pub fn rss(name: &str, url: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            base_url: base_url.to_string(),
            fetch_type: FetchType::Rss,
        }
    }

    pub fn html(
        name: &str,
        url: &str,
        base_url: &str,
        item: &str,
        title: &str,
        link: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            base_url: base_url.to_string(),
            fetch_type: FetchType::Html {
                selectors: Selectors {
                    item: item.to_string(),
                    title: title.to_string(),
                    link: link.to_string(),
                },
            },
        }
    }

    /// Short label for logs: `"rss"` or `"html"`.
    pub fn kind(&self) -> &'static str {
        match self.fetch_type {
            FetchType::Rss => "rss",
            FetchType::Html { .. } => "html",
        }
    }
}

/// An item as found in a feed or listing, before normalization.
///
/// `link` may still be relative here; it is resolved against the source's
/// base URL before an [`Article`] is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    /// Feed `description` / Atom `summary`, usually an HTML fragment.
    pub description: String,
    /// Feed `content:encoded` / Atom `content`, empty when absent.
    pub content: String,
    /// Publish date exactly as written in the feed; listings never have one.
    pub pub_date: Option<String>,
}

/// What the page scraper could recover from an article page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedPage {
    /// Space-joined paragraph text of the main content region, or empty.
    pub content: String,
    /// The page's `og:image`, if any.
    pub image_url: Option<String>,
}

/// A normalized article, the unit written to the output file.
///
/// Built once per successfully processed [`RawItem`] and never mutated.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Fresh random identifier; not stable across runs.
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    /// Truncated body text, or the `"Content unavailable."` placeholder.
    pub content: String,
    pub url: String,
    pub image_url: Option<String>,
    /// Name of the [`SourceConfig`] this article came from.
    pub source: String,
    /// Between one and three topic labels.
    pub topics: Vec<String>,
    /// Synthetic recency (`now - ordinal hours`) unless feed dates are enabled.
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Why a candidate item was dropped instead of becoming an [`Article`].
///
/// Skips never abort a source; they are counted on the source report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("no title element")]
    MissingTitle,
    #[error("empty title")]
    EmptyTitle,
    #[error("placeholder listing entry")]
    NoResults,
    #[error("no link element")]
    MissingLink,
    #[error("link element has no href")]
    MissingHref,
    #[error("link `{0}` is not absolute")]
    UnresolvableLink(String),
}
