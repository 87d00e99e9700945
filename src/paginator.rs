//! Pagination over Google Scholar result pages.
//!
//! [`ResultPaginator`] is a two-state machine: `Active { page_index }` fetches
//! one page per call, `Ended` yields nothing forever. A page without a results
//! container, or with a container but no listings, is the normal end of
//! results and moves the paginator to `Ended`.

use crate::config::ScholarOptions;
use crate::error::{CrawlError, Result};
use crate::fetcher::PageFetcher;
use crate::query::{PageRequest, SearchQuery};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// One result listing inside a fetched page. Borrows the page it came from.
pub type ResultNode<'a> = ElementRef<'a>;

const RESULTS_CONTAINER: &str = "#gs_res_ccl_mid";
const LISTING: &str = ".gs_r.gs_or.gs_scl";

/// Current position of a paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Active { page_index: u32 },
    Ended,
}

/// Why a fetched page ended pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    NoResultsContainer,
    NoListings,
}

#[derive(Debug, Clone)]
struct PageSelectors {
    container: Selector,
    listing: Selector,
}

impl PageSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            container: Selector::parse(RESULTS_CONTAINER)
                .map_err(|e| CrawlError::Parse(e.to_string()))?,
            listing: Selector::parse(LISTING).map_err(|e| CrawlError::Parse(e.to_string()))?,
        })
    }
}

/// A parsed results page holding at least one listing.
pub struct ResultPage {
    page_index: u32,
    document: Html,
    selectors: PageSelectors,
}

impl std::fmt::Debug for ResultPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultPage")
            .field("page_index", &self.page_index)
            .field("listings", &self.listings().len())
            .finish()
    }
}

impl ResultPage {
    fn parse(
        page_index: u32,
        html: &str,
        selectors: &PageSelectors,
    ) -> std::result::Result<Self, Termination> {
        let page = Self {
            page_index,
            document: Html::parse_document(html),
            selectors: selectors.clone(),
        };

        let container = page
            .container()
            .ok_or(Termination::NoResultsContainer)?;
        if container.select(&page.selectors.listing).next().is_none() {
            return Err(Termination::NoListings);
        }
        Ok(page)
    }

    fn container(&self) -> Option<ElementRef<'_>> {
        self.document.select(&self.selectors.container).next()
    }

    /// Zero-based index of this page within the search
    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    /// Listings in document order.
    pub fn listings(&self) -> Vec<ResultNode<'_>> {
        self.container()
            .map(|c| c.select(&self.selectors.listing).collect())
            .unwrap_or_default()
    }
}

/// Drives a [`PageFetcher`] page by page for one [`SearchQuery`].
///
/// Not resettable: construct a new paginator to start over.
pub struct ResultPaginator<F> {
    fetcher: F,
    query: SearchQuery,
    options: ScholarOptions,
    selectors: PageSelectors,
    state: PaginationState,
}

impl<F: PageFetcher> ResultPaginator<F> {
    pub fn new(fetcher: F, query: SearchQuery, options: ScholarOptions) -> Result<Self> {
        Ok(Self {
            fetcher,
            query,
            options,
            selectors: PageSelectors::new()?,
            state: PaginationState::Active { page_index: 0 },
        })
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Fetch the page under the cursor.
    ///
    /// Returns `Ok(None)` once results are exhausted. A fetch error leaves the
    /// cursor where it was.
    pub async fn next_batch(&mut self) -> Result<Option<ResultPage>> {
        let page_index = match self.state {
            PaginationState::Active { page_index } => page_index,
            PaginationState::Ended => return Ok(None),
        };

        let url = self
            .query
            .page_url(&self.options, PageRequest::new(page_index))?;
        debug!(page = page_index, url = %url, "Fetching page");

        let html = self.fetcher.fetch(&url).await?;

        match ResultPage::parse(page_index, &html, &self.selectors) {
            Ok(page) => {
                self.state = PaginationState::Active {
                    page_index: page_index + 1,
                };
                Ok(Some(page))
            }
            Err(reason) => {
                if looks_like_captcha(&html) {
                    warn!(page = page_index, "Page looks like a CAPTCHA interstitial");
                }
                debug!(page = page_index, reason = ?reason, "End of results");
                self.state = PaginationState::Ended;
                Ok(None)
            }
        }
    }
}

fn looks_like_captcha(html: &str) -> bool {
    html.contains("Solving the above CAPTCHA") || html.contains("unusual traffic")
}
