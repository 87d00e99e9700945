//! Crawl session: pagination + extraction + record budget.
//!
//! A session pulls one page at a time. Nothing is fetched until the caller
//! asks for the next batch, so dropping the session (or its stream) stops the
//! crawl. The record budget is checked after each page, so the last batch is
//! never truncated and the total may overshoot `max_records` by up to one page.

use crate::config::ScholarOptions;
use crate::delay::DelayProvider;
use crate::error::Result;
use crate::extractor::{Record, RecordExtractor};
use crate::fetcher::PageFetcher;
use crate::paginator::ResultPaginator;
use crate::query::SearchQuery;
use futures::stream::{self, Stream};
use serde::Serialize;
use tracing::{debug, info};

/// Counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Pages that produced a batch
    pub pages: usize,
    /// Records handed to the caller
    pub emitted: usize,
    /// Listings dropped because a required element was missing
    pub discarded: usize,
    /// Politeness delays taken
    pub delays: usize,
}

pub struct CrawlSession<F, D> {
    paginator: ResultPaginator<F>,
    extractor: RecordExtractor,
    delay: D,
    max_records: usize,
    stats: CrawlStats,
    finished: bool,
}

impl<F: PageFetcher, D: DelayProvider> CrawlSession<F, D> {
    pub fn new(
        fetcher: F,
        delay: D,
        query: SearchQuery,
        options: ScholarOptions,
        max_records: usize,
    ) -> Result<Self> {
        options.validate()?;
        let extractor = RecordExtractor::new(options.citation_marker())?;
        info!(
            query = query.text(),
            min_year = query.min_year(),
            max_records,
            url = options.scholar_url(),
            "Starting Google Scholar crawl"
        );
        Ok(Self {
            paginator: ResultPaginator::new(fetcher, query, options)?,
            extractor,
            delay,
            max_records,
            stats: CrawlStats::default(),
            finished: false,
        })
    }

    pub fn stats(&self) -> CrawlStats {
        self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fetch and extract the next page.
    ///
    /// `Ok(None)` means the crawl is over: results ran out or the budget was
    /// reached. An error is fatal and also ends the session.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<Record>>> {
        if self.finished {
            return Ok(None);
        }

        if self.stats.pages > 0 {
            self.delay.pause().await;
            self.stats.delays += 1;
        }

        let page = match self.paginator.next_batch().await {
            Ok(Some(page)) => page,
            Ok(None) => {
                self.finish();
                return Ok(None);
            }
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        let listings = page.listings();
        let records: Vec<Record> = listings
            .iter()
            .filter_map(|node| self.extractor.extract(*node))
            .collect();
        let discarded = listings.len() - records.len();

        self.stats.pages += 1;
        self.stats.emitted += records.len();
        self.stats.discarded += discarded;
        debug!(
            page = page.page_index(),
            listings = listings.len(),
            records = records.len(),
            discarded,
            "Parsed page"
        );

        if self.stats.emitted >= self.max_records {
            self.finish();
        }

        Ok(Some(records))
    }

    /// Drive the crawl to the end, handing each batch to `on_batch`.
    pub async fn run<S>(&mut self, mut on_batch: S) -> Result<CrawlStats>
    where
        S: FnMut(&[Record]) -> Result<()>,
    {
        while let Some(batch) = self.next_batch().await? {
            on_batch(&batch)?;
        }
        Ok(self.stats)
    }

    /// The session as a lazy stream of batches. The stream ends after the
    /// first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Record>>> {
        stream::try_unfold(self, |mut session| async move {
            Ok(session.next_batch().await?.map(|batch| (batch, session)))
        })
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            info!(
                pages = self.stats.pages,
                records = self.stats.emitted,
                discarded = self.stats.discarded,
                "Crawl complete"
            );
        }
    }
}
