//! Ingestion paths for configured news sources.
//!
//! Sources come in two shapes, and each shape has its own way of discovering
//! items. Both converge on [`crate::models::RawItem`]:
//!
//! | Module | Input | Produces |
//! |--------|-------|----------|
//! | [`rss`] | RSS 2.0 / Atom feed | Up to N raw items with title, link, description, content, date |
//! | [`listing`] | HTML listing page + selectors | One accepted item or skip reason per container |
//! | [`page`] | Individual article page | Paragraph text and `og:image` |
//!
//! # Common Patterns
//!
//! - All network reads go through [`crate::http::Fetch`]
//! - Fetch and parse failures are logged and degrade to empty results; they
//!   never propagate past the source they belong to

pub mod listing;
pub mod page;
pub mod rss;
