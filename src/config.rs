//! Crawl configuration.

use crate::error::{CrawlError, Result};
use std::time::Duration;

/// Default Google Scholar URL
pub const DEFAULT_SCHOLAR_URL: &str = "https://scholar.google.com";

/// Number of listings Google Scholar renders per page.
pub const DEFAULT_RESULTS_PER_PAGE: u32 = 10;

/// Options shared by the fetcher, the URL builder and the session.
#[derive(Debug, Clone)]
pub struct ScholarOptions {
    /// Base URL, overridable for mirror sites
    pub base_url: String,
    /// Interface language sent as `hl`
    pub language: String,
    /// Source data type filter (default: "0,5" for articles only)
    pub sdt: String,
    /// Offset step between consecutive pages
    pub results_per_page: u32,
    /// Proxy URL (e.g., "http://127.0.0.1:7890")
    pub proxy: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Literal phrase preceding the citation count, derived from `language` when unset
    pub cited_by_marker: Option<String>,
    /// Lower bound of the politeness delay between pages
    pub min_delay: Duration,
    /// Upper bound of the politeness delay between pages
    pub max_delay: Duration,
}

impl Default for ScholarOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SCHOLAR_URL.to_string(),
            language: "en".to_string(),
            sdt: "0,5".to_string(),
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
            proxy: None,
            timeout: Duration::from_secs(30),
            cited_by_marker: None,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
        }
    }
}

impl ScholarOptions {
    /// Base URL without trailing slash
    pub fn scholar_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Phrase that introduces the "cited by" count in the chosen interface language.
    pub fn citation_marker(&self) -> &str {
        if let Some(marker) = self.cited_by_marker.as_deref() {
            return marker;
        }
        let lang = self.language.to_ascii_lowercase();
        if lang.starts_with("pt") || lang.starts_with("es") {
            "Citado por"
        } else {
            "Cited by"
        }
    }

    /// Reject option combinations that cannot produce a crawl.
    pub fn validate(&self) -> Result<()> {
        if self.results_per_page == 0 {
            return Err(CrawlError::Config(
                "results_per_page must be at least 1".to_string(),
            ));
        }
        if self.min_delay > self.max_delay {
            return Err(CrawlError::Config(format!(
                "min delay {:?} exceeds max delay {:?}",
                self.min_delay, self.max_delay
            )));
        }
        if self.citation_marker().is_empty() {
            return Err(CrawlError::Config("citation marker is empty".to_string()));
        }
        Ok(())
    }
}
