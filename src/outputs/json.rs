//! JSON output for the dashboard.
//!
//! The whole run is serialized as one pretty-printed JSON array of
//! [`Article`] records, camelCase keys, registry order. The file is replaced
//! on every run; an empty run still writes `[]`.

use crate::models::Article;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `articles` to `path`, creating the parent directory if needed.
///
/// # Returns
///
/// `Ok(())` on success, or an error if serialization, directory creation, or
/// the file write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = articles.len()))]
pub async fn write_articles(articles: &[Article], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(articles)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        info!(dir = %dir.display(), "Ensuring output directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote articles JSON");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StaticFetcher;
    use crate::models::SourceConfig;
    use crate::pipeline::{Pipeline, PipelineConfig, build_article};
    use chrono::Utc;
    use std::time::Duration;

    fn sample() -> Vec<Article> {
        vec![
            build_article(
                "Wired AI",
                "New Model Released",
                "https://www.wired.com/story/new-model/".to_string(),
                "Our new model improves vision and coding. It is safe. It is fast.",
                None,
                Utc::now(),
            ),
            build_article(
                "Anthropic",
                "Claude update",
                "https://www.anthropic.com/news/claude".to_string(),
                "",
                Some("https://img.test/c.png".to_string()),
                Utc::now(),
            ),
        ]
    }

    #[tokio::test]
    async fn test_write_creates_parent_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("articles.json");
        let articles = sample();

        write_articles(&articles, &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let back: Vec<Article> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].source, "Wired AI");
        assert_eq!(back[1].source, "Anthropic");
        assert_eq!(back[0].id, articles[0].id);

        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value[0];
        for key in [
            "id",
            "title",
            "summary",
            "content",
            "url",
            "imageUrl",
            "source",
            "topics",
            "publishedAt",
            "createdAt",
        ] {
            assert!(first.get(key).is_some(), "missing key {key}");
        }
        assert!(first["imageUrl"].is_null());
    }

    #[tokio::test]
    async fn test_empty_run_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");

        write_articles(&[], &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_write_replaces_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        std::fs::write(&path, "stale contents").unwrap();

        write_articles(&sample()[..1], &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let back: Vec<Article> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.len(), 1);
    }

    #[tokio::test]
    async fn test_run_with_failing_source_still_writes_remaining_articles() {
        let listing = r#"<html><body><ul>
            <li><h3>Claude ships</h3><a href="/news/claude">Read</a></li>
            <li><h3>Policy notes</h3><a href="/news/policy">Read</a></li>
        </ul></body></html>"#;
        let listing_url = "https://www.anthropic.com/news";
        let fetcher = StaticFetcher::new().with_page(listing_url, listing);
        let pipeline = Pipeline::new(
            fetcher,
            PipelineConfig {
                item_delay: Duration::ZERO,
                ..PipelineConfig::default()
            },
        );
        let sources = [
            SourceConfig::html(
                "Google AI",
                "https://blog.google/technology/ai/",
                "https://blog.google",
                "article",
                "h3, h2",
                "a",
            ),
            SourceConfig::html(
                "Anthropic",
                listing_url,
                "https://www.anthropic.com",
                "li, article",
                "h3, h2",
                "a",
            ),
        ];

        let report = pipeline.run(&sources).await;
        assert_eq!(report.failed_sources().count(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("articles.json");
        write_articles(&report.into_articles(), &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let back: Vec<Article> = serde_json::from_str(&raw).unwrap();
        let titles: Vec<_> = back.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Claude ships", "Policy notes"]);
        assert!(back.iter().all(|a| a.source == "Anthropic"));
        assert_eq!(back[0].url, "https://www.anthropic.com/news/claude");
    }
}
