//! RSS and Atom feed reader.
//!
//! Feeds are parsed with a streaming `quick-xml` reader rather than a serde
//! model, because real-world feeds mix namespaces (`content:encoded`), CDATA
//! and HTML-flavoured entities that a strict schema rejects.
//!
//! Items are returned in document order; feeds are assumed newest-first and
//! are not re-sorted.

use crate::error::ScrapeError;
use crate::http::Fetch;
use crate::models::RawItem;
use crate::utils::truncate_for_log;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, info, instrument, warn};

/// Which [`RawItem`] field an element feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    Content,
    PubDate,
}

impl Field {
    fn from_element(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"description" | b"summary" => Some(Field::Description),
            b"content:encoded" | b"content" => Some(Field::Content),
            b"pubDate" | b"published" | b"updated" | b"dc:date" => Some(Field::PubDate),
            _ => None,
        }
    }
}

/// Accumulates one `<item>` / `<entry>` while the reader walks it.
#[derive(Default)]
struct ItemBuilder {
    item: RawItem,
    field: Option<(Field, Vec<u8>)>,
    buf: String,
}

impl ItemBuilder {
    fn start_field(&mut self, e: &BytesStart<'_>) {
        if self.field.is_some() {
            return;
        }
        // Atom also allows `<link href=".."></link>`; its href wins over any text.
        if e.name().as_ref() == b"link" && has_href(e) {
            self.atom_link(e);
            return;
        }
        if let Some(field) = Field::from_element(e.name().as_ref()) {
            self.field = Some((field, e.name().as_ref().to_vec()));
            self.buf.clear();
        }
    }

    fn end_field(&mut self, name: &[u8]) {
        let Some((field, open)) = self.field.take() else {
            return;
        };
        if open != name {
            self.field = Some((field, open));
            return;
        }
        let text = std::mem::take(&mut self.buf).trim().to_string();
        self.set(field, text);
    }

    fn set(&mut self, field: Field, text: String) {
        let item = &mut self.item;
        match field {
            Field::Title => item.title = text,
            // Atom links are empty elements with `href`; keep the first one.
            Field::Link if item.link.is_empty() => item.link = text,
            Field::Link => {}
            Field::Description => item.description = text,
            Field::Content => item.content = text,
            Field::PubDate if item.pub_date.is_none() && !text.is_empty() => {
                item.pub_date = Some(text)
            }
            Field::PubDate => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.field.is_some() {
            self.buf.push_str(text);
        }
    }

    /// `<link href="..."/>` as used by Atom.
    fn empty_element(&mut self, e: &BytesStart<'_>) {
        if self.field.is_none() && e.name().as_ref() == b"link" {
            self.atom_link(e);
        }
    }

    /// Take the first `rel="alternate"` (or rel-less) Atom link.
    fn atom_link(&mut self, e: &BytesStart<'_>) {
        if !self.item.link.is_empty() {
            return;
        }
        if let Some(href) = alternate_href(e) {
            self.item.link = href;
        }
    }
}

fn has_href(e: &BytesStart<'_>) -> bool {
    matches!(e.try_get_attribute("href"), Ok(Some(_)))
}

fn alternate_href(e: &BytesStart<'_>) -> Option<String> {
    let rel_ok = match e.try_get_attribute("rel") {
        Ok(Some(rel)) => rel.value.as_ref() == b"alternate",
        _ => true,
    };
    if !rel_ok {
        return None;
    }
    let href = e.try_get_attribute("href").ok()??;
    let value = href.unescape_value().ok()?;
    Some(value.trim().to_string())
}

fn is_item_element(name: &[u8]) -> bool {
    name == b"item" || name == b"entry"
}

/// Parse an RSS 2.0 or Atom document into at most `limit` raw items.
///
/// Returns an error only for malformed XML; a well-formed document without
/// items yields an empty list.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<RawItem>, ScrapeError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<ItemBuilder> = None;

    while items.len() < limit {
        match reader.read_event()? {
            Event::Start(e) => {
                if let Some(builder) = current.as_mut() {
                    builder.start_field(&e);
                } else if is_item_element(e.name().as_ref()) {
                    current = Some(ItemBuilder::default());
                }
            }
            Event::Empty(e) => {
                if let Some(builder) = current.as_mut() {
                    builder.empty_element(&e);
                }
            }
            Event::End(e) => {
                let name = e.name();
                if is_item_element(name.as_ref()) {
                    if let Some(builder) = current.take() {
                        items.push(builder.item);
                    }
                } else if let Some(builder) = current.as_mut() {
                    builder.end_field(name.as_ref());
                }
            }
            Event::Text(e) => {
                if let Some(builder) = current.as_mut() {
                    // Feeds routinely carry HTML entities (&nbsp;) that XML does not define.
                    match e.unescape() {
                        Ok(text) => builder.push_text(&text),
                        Err(_) => builder.push_text(&String::from_utf8_lossy(&e)),
                    }
                }
            }
            Event::CData(e) => {
                if let Some(builder) = current.as_mut() {
                    builder.push_text(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

/// Fetch a feed and return its first `limit` items.
///
/// Never fails: any fetch or parse error is logged and yields an empty list,
/// so one broken feed cannot abort the run.
#[instrument(level = "info", skip(fetcher))]
pub async fn read_feed<F: Fetch>(fetcher: &F, url: &str, limit: usize) -> Vec<RawItem> {
    let body = match fetcher.fetch_text(url).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Feed fetch failed");
            return Vec::new();
        }
    };
    debug!(preview = %truncate_for_log(&body, 500), "Feed content preview");

    match parse_feed(&body, limit) {
        Ok(items) => {
            info!(count = items.len(), "Parsed feed items");
            items
        }
        Err(e) => {
            warn!(
                error = %e,
                preview = %truncate_for_log(&body, 200),
                "Feed parse failed"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StaticFetcher;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Wired AI</title>
    <link>https://www.wired.com</link>
    <item>
      <title>New Model Released</title>
      <link>https://www.wired.com/story/new-model/</link>
      <description>Our new model improves vision &amp; coding.</description>
      <content:encoded><![CDATA[<p>Full <b>body</b> text.</p><img src="https://img.test/a.jpg">]]></content:encoded>
      <pubDate>Tue, 06 May 2025 14:30:00 +0000</pubDate>
    </item>
    <item>
      <title>Second Story</title>
      <link>https://www.wired.com/story/second/</link>
      <description><![CDATA[<p>Short description.</p>]]></description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_items() {
        let items = parse_feed(RSS, 5).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title, "New Model Released");
        assert_eq!(first.link, "https://www.wired.com/story/new-model/");
        assert_eq!(first.description, "Our new model improves vision & coding.");
        assert!(first.content.starts_with("<p>Full <b>body</b>"));
        assert_eq!(
            first.pub_date.as_deref(),
            Some("Tue, 06 May 2025 14:30:00 +0000")
        );

        let second = &items[1];
        assert_eq!(second.content, "");
        assert_eq!(second.description, "<p>Short description.</p>");
        assert_eq!(second.pub_date, None);
    }

    #[test]
    fn test_channel_fields_do_not_leak_into_items() {
        let items = parse_feed(RSS, 5).unwrap();
        assert!(items.iter().all(|i| i.title != "Wired AI"));
    }

    #[test]
    fn test_parse_respects_limit_in_document_order() {
        let mut xml = String::from("<rss><channel>");
        for i in 0..8 {
            xml.push_str(&format!(
                "<item><title>Item {i}</title><link>https://a.test/{i}</link></item>"
            ));
        }
        xml.push_str("</channel></rss>");

        let items = parse_feed(&xml, 5).unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Item 0", "Item 1", "Item 2", "Item 3", "Item 4"]
        );
    }

    #[test]
    fn test_parse_atom_entries() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Blog</title>
  <link href="https://blog.test/"/>
  <entry>
    <title>Atom Post</title>
    <link rel="alternate" href="https://blog.test/atom-post"/>
    <summary>An Atom summary.</summary>
    <published>2025-05-06T10:00:00Z</published>
    <updated>2025-05-07T10:00:00Z</updated>
  </entry>
</feed>"#;
        let items = parse_feed(xml, 5).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Atom Post");
        assert_eq!(items[0].link, "https://blog.test/atom-post");
        assert_eq!(items[0].description, "An Atom summary.");
        assert_eq!(items[0].pub_date.as_deref(), Some("2025-05-06T10:00:00Z"));
    }

    #[test]
    fn test_parse_atom_links_with_closing_tag() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title>Self first</title>
    <link rel="self" href="https://blog.test/self.xml"></link>
    <link rel="alternate" href="https://blog.test/post"></link>
  </entry>
  <entry>
    <title>Bare link</title>
    <link href="https://blog.test/bare"></link>
  </entry>
</feed>"#;
        let items = parse_feed(xml, 5).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link, "https://blog.test/post");
        assert_eq!(items[1].link, "https://blog.test/bare");
    }

    #[test]
    fn test_html_entities_fall_back_to_raw_text() {
        let xml = "<rss><channel><item>\
                   <title>Caf&eacute; AI</title><link>https://a.test/x</link>\
                   </item></channel></rss>";
        let items = parse_feed(xml, 5).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Caf&eacute; AI");
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let xml = "<rss><channel><item><title>Broken</item></channel></rss>";
        assert!(parse_feed(xml, 5).is_err());
    }

    #[tokio::test]
    async fn test_read_feed_swallows_fetch_failure() {
        let fetcher = StaticFetcher::new();
        let items = read_feed(&fetcher, "https://missing.test/rss", 5).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_read_feed_swallows_parse_failure() {
        let url = "https://bad.test/rss";
        let fetcher = StaticFetcher::new().with_page(url, "<html><body>Not a feed");
        let items = read_feed(&fetcher, url, 5).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_read_feed_returns_items() {
        let fetcher = StaticFetcher::new().with_page("https://www.wired.com/rss", RSS);
        let items = read_feed(&fetcher, "https://www.wired.com/rss", 1).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "New Model Released");
    }
}
