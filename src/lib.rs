//! # scholar-crawler
//!
//! Streams structured records out of paginated Google Scholar result pages.
//!
//! ## Modules
//!
//! - [`query`] - Search query and per-page URL construction
//! - [`fetcher`] - Page retrieval over HTTP
//! - [`paginator`] - Page-by-page traversal with end-of-results detection
//! - [`extractor`] - Result listing to [`Record`] conversion
//! - [`session`] - Budgeted, delayed crawl over pages
//! - [`output`] - JSON / CSV record writers
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholar_crawler::{CrawlSession, HttpFetcher, RandomDelay, ScholarOptions, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let options = ScholarOptions::default();
//!     let fetcher = HttpFetcher::new(&options)?;
//!     let delay = RandomDelay::new(options.min_delay, options.max_delay)?;
//!     let query = SearchQuery::new("machine learning", 2020);
//!     let mut session = CrawlSession::new(fetcher, delay, query, options, 50)?;
//!     while let Some(batch) = session.next_batch().await? {
//!         println!("Got {} records", batch.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod delay;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod output;
pub mod paginator;
pub mod query;
pub mod session;

pub use config::ScholarOptions;
pub use delay::{DelayProvider, RandomDelay};
pub use error::{CrawlError, ExtractError, Result};
pub use extractor::{Record, RecordExtractor, NO_PDF};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use paginator::{PaginationState, ResultNode, ResultPage, ResultPaginator};
pub use query::{PageRequest, SearchQuery};
pub use session::{CrawlSession, CrawlStats};
