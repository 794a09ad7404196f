//! Naive text heuristics: extractive summary, keyword topics, content clipping.
//!
//! Everything here is a pure function of its inputs. There is no sentence
//! detection beyond splitting on `.` and no stemming beyond substring search.

use crate::utils::truncate_chars;
use itertools::Itertools;

/// Longest summary before the ellipsis is appended.
pub const SUMMARY_MAX_CHARS: usize = 150;
/// Number of `.`-delimited fragments kept in a summary.
pub const SUMMARY_SENTENCES: usize = 3;
/// Content shorter than this gets a synthesized summary instead.
pub const SUMMARY_MIN_CONTENT_CHARS: usize = 20;
/// Characters of body text kept in [`crate::models::Article::content`].
pub const CONTENT_MAX_CHARS: usize = 1000;
/// Characters of body text scanned for topic keywords.
pub const TOPIC_SCAN_CHARS: usize = 1000;
pub const MAX_TOPICS: usize = 3;

pub const ELLIPSIS: &str = "...";
pub const CONTENT_UNAVAILABLE: &str = "Content unavailable.";

/// Lowercase keyword to topic label, scanned in this order.
pub static KEYWORD_TOPICS: &[(&str, &str)] = &[
    ("gpt", "GPT"),
    ("claude", "Claude"),
    ("gemini", "Gemini"),
    ("llm", "LLM"),
    ("language model", "LLM"),
    ("multimodal", "Multimodal AI"),
    ("vision", "Computer Vision"),
    ("image", "Computer Vision"),
    ("code", "Coding"),
    ("coding", "Coding"),
    ("programming", "Coding"),
    ("safety", "AI Safety"),
    ("safe", "AI Safety"),
    ("alignment", "AI Alignment"),
    ("regulation", "AI Regulation"),
    ("policy", "AI Policy"),
    ("open source", "Open Source"),
    ("research", "Research"),
];

/// Appended when fewer than [`MAX_TOPICS`] keywords matched.
pub static DEFAULT_TOPICS: &[&str] = &["AI", "Technology", "Machine Learning"];

/// Build a short extractive summary.
///
/// Short or missing content yields `"This is an article about {title}."`.
/// Otherwise the first three `.`-delimited fragments are rejoined, and the
/// result is cut to 150 characters plus `...` when longer.
pub fn summarize(content: &str, title: &str) -> String {
    if content.chars().count() < SUMMARY_MIN_CONTENT_CHARS {
        return format!("This is an article about {title}.");
    }

    let mut summary = content.split('.').take(SUMMARY_SENTENCES).join(".");
    summary.push('.');

    if summary.chars().count() > SUMMARY_MAX_CHARS {
        let mut cut = truncate_chars(&summary, SUMMARY_MAX_CHARS).to_string();
        cut.push_str(ELLIPSIS);
        return cut;
    }
    summary
}

/// Pick up to three topic labels for an article.
///
/// Keywords are matched as substrings of the lowercased title plus the first
/// 1000 characters of content. Labels keep discovery order, duplicates are
/// dropped, and defaults pad the list when fewer than three matched.
pub fn extract_topics(content: &str, title: &str) -> Vec<String> {
    let scanned = truncate_chars(content, TOPIC_SCAN_CHARS);
    let haystack = format!("{title} {scanned}").to_lowercase();

    let found: Vec<&str> = KEYWORD_TOPICS
        .iter()
        .filter(|(keyword, _)| haystack.contains(keyword))
        .map(|(_, topic)| *topic)
        .unique()
        .collect();

    let padding: &[&str] = if found.len() < MAX_TOPICS {
        DEFAULT_TOPICS
    } else {
        &[]
    };

    found
        .into_iter()
        .chain(padding.iter().copied())
        .unique()
        .take(MAX_TOPICS)
        .map(str::to_string)
        .collect()
}

/// Clip body text for the `content` field, or return the placeholder.
pub fn clip_content(content: &str) -> String {
    if content.trim().is_empty() {
        return CONTENT_UNAVAILABLE.to_string();
    }
    let head = truncate_chars(content, CONTENT_MAX_CHARS);
    format!("{head}{ELLIPSIS}")
}
