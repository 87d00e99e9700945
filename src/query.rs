//! Search query values and URL construction.

use crate::config::ScholarOptions;
use crate::error::{CrawlError, Result};
use url::Url;

/// An immutable search: free text plus a lower bound on publication year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    min_year: i32,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, min_year: i32) -> Self {
        Self {
            text: text.into(),
            min_year,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn min_year(&self) -> i32 {
        self.min_year
    }

    /// Build the search URL for one page of results.
    ///
    /// The query text is form-encoded, so spaces become `+`.
    pub fn page_url(&self, options: &ScholarOptions, request: PageRequest) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/scholar", options.scholar_url()))
            .map_err(|e| CrawlError::Config(format!("Invalid base URL: {}", e)))?;

        {
            let mut params = url.query_pairs_mut();
            params.append_pair(
                "start",
                &request.offset(options.results_per_page).to_string(),
            );
            params.append_pair("q", &self.text);
            params.append_pair("hl", &options.language);
            params.append_pair("as_sdt", &options.sdt);
            params.append_pair("as_ylo", &self.min_year.to_string());
        }

        Ok(url)
    }
}

/// A single page of a search, identified by its zero-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: u32,
}

impl PageRequest {
    pub fn new(page_index: u32) -> Self {
        Self { page_index }
    }

    /// Zero-based offset of the first listing on this page
    pub fn offset(&self, results_per_page: u32) -> u64 {
        u64::from(self.page_index) * u64::from(results_per_page)
    }
}
