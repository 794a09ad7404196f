//! Error types for fetching, parsing, and source configuration.
//!
//! Almost every failure in a run is recovered locally (a source yields no
//! articles, a page yields no content). These types exist so that recovery
//! sites can log a precise reason and the retry layer can tell transient
//! failures from permanent ones.

use thiserror::Error;

/// Failure while fetching or parsing a remote document.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// The feed body is not well-formed XML.
    #[error("feed parsing failed: {0}")]
    Xml(String),

    /// A configured CSS selector could not be parsed.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
}

impl ScrapeError {
    /// Whether retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Http(e) => !e.is_builder() && !e.is_redirect(),
            ScrapeError::Status { status, .. } => *status == 429 || *status >= 500,
            ScrapeError::Xml(_) | ScrapeError::Selector { .. } => false,
        }
    }
}

impl From<quick_xml::Error> for ScrapeError {
    fn from(err: quick_xml::Error) -> Self {
        ScrapeError::Xml(err.to_string())
    }
}

/// Failure while loading or validating the source registry.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid sources file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no sources configured")]
    Empty,

    #[error("duplicate source name: {0}")]
    DuplicateName(String),

    #[error("source `{0}` has an empty url")]
    EmptyUrl(String),

    #[error("source `{name}`: {source}")]
    Selector {
        name: String,
        #[source]
        source: ScrapeError,
    },
}
