//! Custom error types for scholar-crawler.
//!
//! Two layers of failure exist. [`CrawlError`] is fatal to a crawl (transport
//! failures, bad configuration). [`ExtractError`] is scoped to a single result
//! listing and never escapes the extractor.

use thiserror::Error;

/// Main error type for crawl operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered 429
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Upstream answered with a non-success status
    #[error("HTTP error: {code} - {message}")]
    Http {
        /// Status code returned by the server
        code: u16,
        /// Human readable status description
        message: String,
    },

    /// Selector construction error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias using `CrawlError`
pub type Result<T> = std::result::Result<T, CrawlError>;

/// A required part of a result listing is missing, so the whole record is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("listing has no title element")]
    MissingTitle,

    #[error("title has no link to the publication")]
    MissingPublicationLink,

    #[error("PDF snippet has no anchor with a link target")]
    MissingPdfAnchor,
}

/// Extension trait for turning a missing element into an [`ExtractError`]
pub trait OptionExt<T> {
    /// Convert Option to Result with the given extraction error
    fn or_missing(self, err: ExtractError) -> std::result::Result<T, ExtractError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_missing(self, err: ExtractError) -> std::result::Result<T, ExtractError> {
        self.ok_or(err)
    }
}
