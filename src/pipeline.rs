//! Aggregation pipeline: sources in, normalized articles out.
//!
//! Each source is scraped through the ingestion path its [`FetchType`] names.
//! Both paths end in [`build_article`], so RSS items and HTML listing entries
//! produce identical [`Article`] records.
//!
//! # Failure Isolation
//!
//! - A source whose feed or listing cannot be fetched contributes zero articles
//! - An item that cannot be normalized is recorded as a [`SkipReason`]
//! - An article page that cannot be fetched falls back to empty content
//!
//! Nothing here aborts the run; the caller decides what to do with the
//! resulting [`RunReport`].

use crate::heuristics::{clip_content, extract_topics, summarize};
use crate::http::Fetch;
use crate::models::{Article, FetchType, RawItem, Selectors, SkipReason, SourceConfig};
use crate::scrapers::listing::{ListingSelectors, extract_candidates};
use crate::scrapers::page::{first_inline_image, fragment_text, scrape_page};
use crate::scrapers::rss::read_feed;
use crate::utils::resolve_link;
use chrono::{DateTime, TimeDelta, Utc};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Runtime knobs for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Articles kept per source.
    pub max_items: usize,
    /// Pause after each produced article, to go easy on the sources.
    pub item_delay: Duration,
    /// Sources scraped at the same time. Output order never depends on it.
    pub concurrency: usize,
    /// Use the feed's own publish date when it parses, instead of the
    /// synthetic `now - ordinal hours`.
    pub use_feed_dates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_items: 5,
            item_delay: Duration::from_secs(1),
            concurrency: 1,
            use_feed_dates: false,
        }
    }
}

/// Outcome of scraping a single source.
#[derive(Debug)]
pub struct SourceReport {
    pub source: String,
    pub articles: Vec<Article>,
    pub skipped: Vec<SkipReason>,
    /// Set when the source as a whole failed (listing fetch, bad selector).
    pub error: Option<String>,
}

impl SourceReport {
    fn new(source: &SourceConfig) -> Self {
        Self {
            source: source.name.clone(),
            articles: Vec::new(),
            skipped: Vec::new(),
            error: None,
        }
    }

    fn failed(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Outcome of a whole run, one report per source in registry order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
}

impl RunReport {
    pub fn article_count(&self) -> usize {
        self.sources.iter().map(|s| s.articles.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.sources.iter().map(|s| s.skipped.len()).sum()
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.error.is_some())
    }

    /// All articles, concatenated in registry order.
    pub fn into_articles(self) -> Vec<Article> {
        self.sources.into_iter().flat_map(|s| s.articles).collect()
    }
}

/// Assemble a normalized article from resolved parts.
///
/// `content` is the plain body text; summary and topics are derived from it
/// before it is clipped.
pub fn build_article(
    source: &str,
    title: &str,
    url: String,
    content: &str,
    image_url: Option<String>,
    published_at: DateTime<Utc>,
) -> Article {
    Article {
        id: Uuid::new_v4(),
        title: title.to_string(),
        summary: summarize(content, title),
        content: clip_content(content),
        url,
        image_url,
        source: source.to_string(),
        topics: extract_topics(content, title),
        published_at,
        created_at: Utc::now(),
    }
}

fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .or_else(|_| DateTime::parse_from_rfc3339(raw.trim()))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn checked_title(raw: &str) -> Result<&str, SkipReason> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(SkipReason::EmptyTitle);
    }
    Ok(title)
}

fn checked_link(raw: &str, base_url: &str) -> Result<String, SkipReason> {
    if raw.trim().is_empty() {
        return Err(SkipReason::MissingLink);
    }
    match resolve_link(raw, base_url) {
        Some(url) => Ok(url),
        None => Err(SkipReason::UnresolvableLink(raw.trim().to_string())),
    }
}

/// Scrapes configured sources through a [`Fetch`] implementation.
#[derive(Debug)]
pub struct Pipeline<F> {
    fetcher: F,
    config: PipelineConfig,
}

impl<F: Fetch> Pipeline<F> {
    pub fn new(fetcher: F, config: PipelineConfig) -> Self {
        Self { fetcher, config }
    }

    /// Scrape every source and collect the per-source reports in input order.
    #[instrument(level = "info", skip_all, fields(sources = sources.len()))]
    pub async fn run(&self, sources: &[SourceConfig]) -> RunReport {
        let reports: Vec<SourceReport> = stream::iter(sources)
            .map(|source| self.scrape_source(source))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let report = RunReport { sources: reports };
        info!(
            articles = report.article_count(),
            skipped = report.skipped_count(),
            failed_sources = report.failed_sources().count(),
            "Pipeline run complete"
        );
        report
    }

    /// Scrape one source; failures are captured in the report.
    #[instrument(level = "info", skip_all, fields(source = %source.name, kind = source.kind()))]
    pub async fn scrape_source(&self, source: &SourceConfig) -> SourceReport {
        info!(url = %source.url, "Scraping source");
        let report = match &source.fetch_type {
            FetchType::Rss => self.scrape_rss(source).await,
            FetchType::Html { selectors } => self.scrape_html(source, selectors).await,
        };

        match &report.error {
            Some(e) => warn!(error = %e, "Source failed; continuing with next source"),
            None => info!(
                articles = report.articles.len(),
                skipped = report.skipped.len(),
                "Source complete"
            ),
        }
        report
    }

    async fn scrape_rss(&self, source: &SourceConfig) -> SourceReport {
        let mut report = SourceReport::new(source);
        let items = read_feed(&self.fetcher, &source.url, self.config.max_items).await;

        for (index, item) in items.into_iter().enumerate() {
            match self.process_feed_item(source, item, index).await {
                Ok(article) => {
                    info!(title = %article.title, "Found article");
                    report.articles.push(article);
                    self.pause().await;
                }
                Err(reason) => {
                    warn!(index, %reason, "Skipping feed item");
                    report.skipped.push(reason);
                }
            }
        }
        report
    }

    async fn process_feed_item(
        &self,
        source: &SourceConfig,
        item: RawItem,
        index: usize,
    ) -> Result<Article, SkipReason> {
        let title = checked_title(&item.title)?;
        let url = checked_link(&item.link, &source.base_url)?;

        let body = if item.content.is_empty() {
            &item.description
        } else {
            &item.content
        };

        // A body of pure markup (an image, an embed) counts as empty.
        let text = fragment_text(body);
        let (content, image_url) = if text.is_empty() {
            debug!(%url, "Feed item has no body text; scraping article page");
            let page = scrape_page(&self.fetcher, &url).await;
            let image_url = page.image_url.or_else(|| first_inline_image(body));
            (page.content, image_url)
        } else {
            (text, first_inline_image(body))
        };

        let published_at = self.published_at(index, item.pub_date.as_deref());
        Ok(build_article(
            &source.name,
            title,
            url,
            &content,
            image_url,
            published_at,
        ))
    }

    async fn scrape_html(&self, source: &SourceConfig, selectors: &Selectors) -> SourceReport {
        let report = SourceReport::new(source);

        let selectors = match ListingSelectors::parse(selectors) {
            Ok(parsed) => parsed,
            Err(e) => return report.failed(e),
        };
        let html = match self.fetcher.fetch_text(&source.url).await {
            Ok(html) => html,
            Err(e) => return report.failed(e),
        };

        let candidates = extract_candidates(&html, &selectors);
        info!(candidates = candidates.len(), "Found listing candidates");
        self.process_candidates(source, candidates, report).await
    }

    async fn process_candidates(
        &self,
        source: &SourceConfig,
        candidates: Vec<Result<RawItem, SkipReason>>,
        mut report: SourceReport,
    ) -> SourceReport {
        for candidate in candidates {
            if report.articles.len() >= self.config.max_items {
                break;
            }

            let outcome = match candidate {
                Ok(item) => {
                    let accepted = report.articles.len();
                    self.process_listing_item(source, item, accepted).await
                }
                Err(reason) => Err(reason),
            };

            match outcome {
                Ok(article) => {
                    info!(title = %article.title, "Found article");
                    report.articles.push(article);
                    self.pause().await;
                }
                Err(reason) => {
                    debug!(%reason, "Skipping listing candidate");
                    report.skipped.push(reason);
                }
            }
        }
        report
    }

    async fn process_listing_item(
        &self,
        source: &SourceConfig,
        item: RawItem,
        accepted: usize,
    ) -> Result<Article, SkipReason> {
        let title = checked_title(&item.title)?;
        let url = checked_link(&item.link, &source.base_url)?;

        let page = scrape_page(&self.fetcher, &url).await;
        let published_at = self.published_at(accepted, None);
        Ok(build_article(
            &source.name,
            title,
            url,
            &page.content,
            page.image_url,
            published_at,
        ))
    }

    /// `now - ordinal hours`, so earlier-found items sort as more recent.
    fn published_at(&self, ordinal: usize, feed_date: Option<&str>) -> DateTime<Utc> {
        if self.config.use_feed_dates {
            if let Some(date) = feed_date.and_then(parse_feed_date) {
                return date;
            }
        }
        let hours = i64::try_from(ordinal).unwrap_or(i64::MAX).min(24 * 365);
        Utc::now() - TimeDelta::hours(hours)
    }

    async fn pause(&self) {
        if !self.config.item_delay.is_zero() {
            sleep(self.config.item_delay).await;
        }
    }
}
