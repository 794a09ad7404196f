//! HTML listing extraction.
//!
//! Applies a source's [`Selectors`] to its listing page and turns every
//! matching container into either a [`RawItem`] or the reason it was rejected.
//! The caller decides how many accepted items to keep, so rejected candidates
//! never count against the per-source cap.

use crate::error::ScrapeError;
use crate::models::{RawItem, Selectors, SkipReason};
use scraper::{ElementRef, Html, Selector};

/// Title some listings render in an empty search/results slot.
pub const NO_RESULTS_SENTINEL: &str = "No results found.";

/// Parse a CSS selector group from configuration.
pub fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

/// The three parsed selectors of an HTML source.
#[derive(Debug)]
pub struct ListingSelectors {
    item: Selector,
    title: Selector,
    link: Selector,
}

impl ListingSelectors {
    pub fn parse(selectors: &Selectors) -> Result<Self, ScrapeError> {
        Ok(Self {
            item: parse_selector(&selectors.item)?,
            title: parse_selector(&selectors.title)?,
            link: parse_selector(&selectors.link)?,
        })
    }
}

fn candidate(
    container: ElementRef<'_>,
    selectors: &ListingSelectors,
) -> Result<RawItem, SkipReason> {
    let title_elem = container
        .select(&selectors.title)
        .next()
        .ok_or(SkipReason::MissingTitle)?;
    let title = title_elem.text().collect::<String>().trim().to_string();
    if title.is_empty() {
        return Err(SkipReason::EmptyTitle);
    }
    if title == NO_RESULTS_SENTINEL {
        return Err(SkipReason::NoResults);
    }

    let link_elem = container
        .select(&selectors.link)
        .next()
        .ok_or(SkipReason::MissingLink)?;
    let link = link_elem
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or(SkipReason::MissingHref)?;

    Ok(RawItem {
        title,
        link: link.to_string(),
        ..RawItem::default()
    })
}

/// Extract every candidate container of a listing page, in document order.
pub fn extract_candidates(
    html: &str,
    selectors: &ListingSelectors,
) -> Vec<Result<RawItem, SkipReason>> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.item)
        .map(|container| candidate(container, selectors))
        .collect()
}
