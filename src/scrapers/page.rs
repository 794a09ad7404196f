//! Article page scraper.
//!
//! Pulls best-effort body text and a representative image out of an arbitrary
//! article page. Layouts differ wildly between sites, so extraction is
//! deliberately generic: the first `<article>` (or `<main>`) region's
//! paragraphs, and the Open Graph image.

use crate::http::Fetch;
use crate::models::ScrapedPage;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse("main").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"]"#).unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Extract content and image from an already-fetched HTML document.
pub fn extract_page(html: &str) -> ScrapedPage {
    let document = Html::parse_document(html);

    let body = document
        .select(&ARTICLE)
        .next()
        .or_else(|| document.select(&MAIN).next());

    let content = body
        .map(|region| {
            region
                .select(&PARAGRAPH)
                .map(|p| p.text().collect::<String>())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let image_url = document
        .select(&OG_IMAGE)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string);

    ScrapedPage { content, image_url }
}

/// Return the `src` of the first `<img>` in an HTML fragment.
///
/// Used on RSS descriptions, which often embed the lead image inline.
pub fn first_inline_image(fragment: &str) -> Option<String> {
    let html = Html::parse_fragment(fragment);
    html.select(&IMG)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

/// Flatten an HTML fragment (an RSS description, say) to plain text.
///
/// Text nodes are joined and runs of whitespace collapse to one space.
pub fn fragment_text(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    let text = html.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fetch an article page and extract its content and image.
///
/// Never fails: a fetch error yields an empty [`ScrapedPage`].
#[instrument(level = "info", skip(fetcher))]
pub async fn scrape_page<F: Fetch>(fetcher: &F, url: &str) -> ScrapedPage {
    match fetcher.fetch_text(url).await {
        Ok(html) => {
            let page = extract_page(&html);
            debug!(
                chars = page.content.chars().count(),
                has_image = page.image_url.is_some(),
                "Parsed article page"
            );
            page
        }
        Err(e) => {
            warn!(error = %e, "Article fetch failed");
            ScrapedPage::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StaticFetcher;

    #[test]
    fn test_extract_prefers_article_region() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://img.test/hero.png">
        </head><body>
            <main><p>Main paragraph.</p></main>
            <article><p>First paragraph.</p><div><p>Second <em>one</em>.</p></div></article>
        </body></html>"#;
        let page = extract_page(html);
        assert_eq!(page.content, "First paragraph. Second one.");
        assert_eq!(page.image_url.as_deref(), Some("https://img.test/hero.png"));
    }

    #[test]
    fn test_extract_falls_back_to_main() {
        let html = "<html><body><p>Outside.</p><main><p>Inside main.</p></main></body></html>";
        let page = extract_page(html);
        assert_eq!(page.content, "Inside main.");
        assert_eq!(page.image_url, None);
    }

    #[test]
    fn test_extract_without_content_region() {
        let html = "<html><body><div><p>Loose text.</p></div></body></html>";
        assert_eq!(extract_page(html), ScrapedPage::default());
    }

    #[test]
    fn test_empty_og_image_is_ignored() {
        let html =
            r#"<html><head><meta property="og:image" content=" "></head><body></body></html>"#;
        assert_eq!(extract_page(html).image_url, None);
    }

    #[test]
    fn test_first_inline_image() {
        let fragment = r#"<p>Lead</p><img src="/a.png"><img src="/b.png">"#;
        assert_eq!(first_inline_image(fragment).as_deref(), Some("/a.png"));
        // Only the first tag is considered.
        let src_on_second = r#"<img alt="x"><img src="/b.png">"#;
        assert_eq!(first_inline_image(src_on_second), None);
        assert_eq!(first_inline_image("<p>No images</p>"), None);
        assert_eq!(first_inline_image("plain text"), None);
    }

    #[test]
    fn test_fragment_text() {
        assert_eq!(
            fragment_text("<p>Full <b>body</b>\n text.</p><img src=\"/a.png\">"),
            "Full body text."
        );
        assert_eq!(fragment_text("Plain text & more."), "Plain text & more.");
        assert_eq!(fragment_text("<br/>"), "");
    }

    #[tokio::test]
    async fn test_scrape_page_failure_is_empty() {
        let fetcher = StaticFetcher::new();
        let page = scrape_page(&fetcher, "https://gone.test/article").await;
        assert_eq!(page, ScrapedPage::default());
    }

    #[tokio::test]
    async fn test_scrape_page_fetches_and_extracts() {
        let url = "https://a.test/post";
        let body = "<article><p>Hello there.</p></article>";
        let fetcher = StaticFetcher::new().with_page(url, body);
        let page = scrape_page(&fetcher, url).await;
        assert_eq!(page.content, "Hello there.");
    }
}
