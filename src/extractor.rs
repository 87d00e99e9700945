//! Per-listing record extraction.
//!
//! Title, publication link and (when present) the PDF snippet anchor are
//! required: if any is missing the listing is dropped and logged. Every other
//! field degrades to `None` on its own without affecting the rest.

use crate::error::{CrawlError, ExtractError, OptionExt, Result};
use crate::paginator::ResultNode;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Placeholder for listings without a PDF snippet
pub const NO_PDF: &str = "-";

/// A single parsed search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Article title
    pub title: String,
    /// Author names as listed in the metadata line
    pub authors: Option<Vec<String>>,
    /// Link behind the title
    pub publication_link: String,
    /// "Cited by" count
    pub citation_count: Option<u64>,
    /// Direct PDF link, or [`NO_PDF`]
    pub pdf_link: String,
    /// Venue part of the metadata line
    pub venue: Option<String>,
    /// Four character year starting with "20"
    pub year: Option<String>,
}

impl Record {
    pub fn has_pdf(&self) -> bool {
        self.pdf_link != NO_PDF
    }
}

/// Authors, venue and year share one failure domain.
#[derive(Debug, Default, PartialEq, Eq)]
struct Metadata {
    authors: Option<Vec<String>>,
    venue: Option<String>,
    year: Option<String>,
}

/// Turns result listings into [`Record`]s.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    title: Selector,
    anchor: Selector,
    pdf_snippet: Selector,
    pdf_anchor: Selector,
    info_block: Selector,
    footer: Selector,
    metadata: Selector,
    cited_by_marker: String,
}

impl RecordExtractor {
    /// `cited_by_marker` is the literal phrase preceding the citation count,
    /// e.g. "Cited by".
    pub fn new(cited_by_marker: impl Into<String>) -> Result<Self> {
        let parse = |css: &str| Selector::parse(css).map_err(|e| CrawlError::Parse(e.to_string()));
        Ok(Self {
            title: parse(".gs_rt")?,
            anchor: parse("a")?,
            pdf_snippet: parse(".gs_or_ggsm")?,
            pdf_anchor: parse("a[href]")?,
            info_block: parse(".gs_ri")?,
            footer: parse(".gs_fl")?,
            metadata: parse(".gs_a")?,
            cited_by_marker: cited_by_marker.into(),
        })
    }

    /// Extract one listing, logging and returning `None` if it is unusable.
    pub fn extract(&self, node: ResultNode<'_>) -> Option<Record> {
        match self.try_extract(node) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Discarding result listing");
                None
            }
        }
    }

    /// Extract one listing, reporting which required element was missing.
    pub fn try_extract(&self, node: ResultNode<'_>) -> std::result::Result<Record, ExtractError> {
        let title_elem = node
            .select(&self.title)
            .next()
            .or_missing(ExtractError::MissingTitle)?;
        let title = title_elem.text().collect::<String>().trim().to_string();

        // The first anchor inside the title must carry the link.
        let publication_link = title_elem
            .select(&self.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .or_missing(ExtractError::MissingPublicationLink)?
            .to_string();

        let pdf_link = self.pdf_link(node)?;
        let citation_count = self.citation_count(node);
        let Metadata {
            authors,
            venue,
            year,
        } = self.metadata(node).unwrap_or_default();

        Ok(Record {
            title,
            authors,
            publication_link,
            citation_count,
            pdf_link,
            venue,
            year,
        })
    }

    fn pdf_link(&self, node: ResultNode<'_>) -> std::result::Result<String, ExtractError> {
        let Some(snippet) = node.select(&self.pdf_snippet).next() else {
            return Ok(NO_PDF.to_string());
        };
        snippet
            .select(&self.pdf_anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
            .or_missing(ExtractError::MissingPdfAnchor)
    }

    fn citation_count(&self, node: ResultNode<'_>) -> Option<u64> {
        let info = node.select(&self.info_block).next()?;
        let footer = info.select(&self.footer).next()?;
        scrape_citation_count(&footer.html(), &self.cited_by_marker)
    }

    fn metadata(&self, node: ResultNode<'_>) -> Option<Metadata> {
        let block = node.select(&self.metadata).next()?;
        parse_metadata(&block.text().collect::<String>())
    }
}

/// Scan serialized markup for `marker`, skip one separator character and
/// read up to the next closing tag. Only an all-digit run counts.
fn scrape_citation_count(markup: &str, marker: &str) -> Option<u64> {
    let start = markup.find(marker)? + marker.len();
    let mut rest = markup[start..].chars();
    rest.next()?;
    let rest = rest.as_str();
    let run = &rest[..rest.find("</").unwrap_or(rest.len())];

    if run.is_empty() || !run.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    run.parse().ok()
}

/// Split "Author1, Author2, ..., Venue, Year" into its parts.
///
/// Everything before the last two segments is authors. The last two segments
/// are kept together as the venue so that every segment lands in exactly one
/// field and a venue name containing ", " is not cut in half. The year is
/// read from the last segment only, which is where the line puts it; scanning
/// the whole venue would pick up a "20" inside the venue name first.
///
/// A line without ", " has no authors and is all venue. Only a blank line is
/// treated as missing.
fn parse_metadata(text: &str) -> Option<Metadata> {
    if text.trim().is_empty() {
        return None;
    }

    let segments: Vec<&str> = text.split(", ").collect();
    let split = segments.len().saturating_sub(2);
    let authors = segments[..split].iter().map(|s| s.to_string()).collect();
    let venue = segments[split..].join(", ");
    let year = segments.last().and_then(|last| year_from(last));

    Some(Metadata {
        authors: Some(authors),
        venue: Some(venue),
        year,
    })
}

/// The four characters starting at the first "20", if there are four.
fn year_from(text: &str) -> Option<String> {
    let start = text.find("20")?;
    let year: String = text[start..].chars().take(4).collect();
    (year.chars().count() == 4).then_some(year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn listing_doc(inner: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><body><div class="gs_r gs_or gs_scl">{inner}</div></body></html>"#
        ))
    }

    fn extract_from(doc: &Html) -> std::result::Result<Record, ExtractError> {
        let extractor = RecordExtractor::new("Cited by").expect("extractor");
        let listing = Selector::parse(".gs_r").expect("selector");
        let node = doc.select(&listing).next().expect("listing");
        extractor.try_extract(node)
    }

    const FULL: &str = r#"
        <div class="gs_ggs gs_fl"><div class="gs_ggsd"><div class="gs_or_ggsm">
            <a href="https://example.org/paper.pdf"><span>[PDF]</span> example.org</a>
        </div></div></div>
        <div class="gs_ri">
            <h3 class="gs_rt"><a href="https://example.org/paper">Deep Learning for Slopes</a></h3>
            <div class="gs_a">A Smith, B Jones, ACM Conf, 2019</div>
            <div class="gs_rs">snippet</div>
            <div class="gs_fl gs_flb"><a href="/scholar?q=related">Related</a><a href="/scholar?cites=1">Cited by 42</a></div>
        </div>"#;

    #[test]
    fn test_full_listing() {
        let doc = listing_doc(FULL);
        let record = extract_from(&doc).expect("record");
        assert_eq!(record.title, "Deep Learning for Slopes");
        assert_eq!(record.publication_link, "https://example.org/paper");
        assert_eq!(record.pdf_link, "https://example.org/paper.pdf");
        assert!(record.has_pdf());
        assert_eq!(record.citation_count, Some(42));
        assert_eq!(
            record.authors,
            Some(vec!["A Smith".to_string(), "B Jones".to_string()])
        );
        assert_eq!(record.venue.as_deref(), Some("ACM Conf, 2019"));
        assert_eq!(record.year.as_deref(), Some("2019"));
    }

    #[test]
    fn test_missing_title_discards() {
        let doc = listing_doc(r#"<div class="gs_ri"><div class="gs_a">A, B, C, 2020</div></div>"#);
        assert_eq!(extract_from(&doc), Err(ExtractError::MissingTitle));
    }

    #[test]
    fn test_missing_link_discards() {
        let doc = listing_doc(r#"<h3 class="gs_rt"><span>[CITATION]</span> No link</h3>"#);
        assert_eq!(extract_from(&doc), Err(ExtractError::MissingPublicationLink));
    }

    #[test]
    fn test_missing_title_checked_before_pdf() {
        let doc = listing_doc(r#"<div class="gs_or_ggsm">no anchor</div>"#);
        assert_eq!(extract_from(&doc), Err(ExtractError::MissingTitle));
    }

    #[test]
    fn test_pdf_sentinel_when_absent() {
        let doc = listing_doc(r#"<h3 class="gs_rt"><a href="/x">X</a></h3>"#);
        let record = extract_from(&doc).expect("record");
        assert_eq!(record.pdf_link, NO_PDF);
        assert!(!record.has_pdf());
        assert_eq!(record.citation_count, None);
        assert_eq!(record.authors, None);
        assert_eq!(record.venue, None);
        assert_eq!(record.year, None);
    }

    #[test]
    fn test_malformed_pdf_snippet_discards() {
        let doc = listing_doc(
            r#"<div class="gs_or_ggsm"><span>[PDF]</span></div><h3 class="gs_rt"><a href="/x">X</a></h3>"#,
        );
        assert_eq!(extract_from(&doc), Err(ExtractError::MissingPdfAnchor));
    }

    #[test]
    fn test_extract_logs_and_returns_none() {
        let doc = listing_doc("<p>junk</p>");
        let extractor = RecordExtractor::new("Cited by").expect("extractor");
        let listing = Selector::parse(".gs_r").expect("selector");
        let node = doc.select(&listing).next().expect("listing");
        assert!(extractor.extract(node).is_none());
    }

    #[test]
    fn test_extract_is_repeatable() {
        let doc = listing_doc(FULL);
        let extractor = RecordExtractor::new("Cited by").expect("extractor");
        let listing = Selector::parse(".gs_r").expect("selector");
        let node = doc.select(&listing).next().expect("listing");
        assert_eq!(extractor.extract(node), extractor.extract(node));
    }

    #[test]
    fn test_citation_scrape() {
        let marker = "Cited by";
        assert_eq!(
            scrape_citation_count(r#"<div><a>Cited by 7</a></div>"#, marker),
            Some(7)
        );
        assert_eq!(
            scrape_citation_count(r#"<div><a>Cited by 7k</a></div>"#, marker),
            None
        );
        assert_eq!(
            scrape_citation_count(r#"<div><a>Cited by </a></div>"#, marker),
            None
        );
        assert_eq!(scrape_citation_count(r#"<div><a>Related</a></div>"#, marker), None);
        assert_eq!(
            scrape_citation_count(r#"<a>Citado por 1234</a>"#, "Citado por"),
            Some(1234)
        );
    }

    #[test]
    fn test_citation_without_info_block() {
        let doc = listing_doc(
            r#"<h3 class="gs_rt"><a href="/x">X</a></h3><div class="gs_fl"><a>Cited by 9</a></div>"#,
        );
        assert_eq!(extract_from(&doc).expect("record").citation_count, None);
    }

    #[test]
    fn test_metadata_split() {
        let meta = parse_metadata("A, B, ACM Conf, 2019").expect("metadata");
        assert_eq!(meta.authors.map(|a| a.join(",")).as_deref(), Some("A,B"));
        assert_eq!(meta.venue.as_deref(), Some("ACM Conf, 2019"));
        assert_eq!(meta.year.as_deref(), Some("2019"));
    }

    #[test]
    fn test_metadata_without_year() {
        let meta = parse_metadata("A, Journal of Things, 1998").expect("metadata");
        assert_eq!(meta.venue.as_deref(), Some("Journal of Things, 1998"));
        assert_eq!(meta.year, None);
    }

    #[test]
    fn test_metadata_malformed() {
        assert_eq!(parse_metadata(""), None);
        assert_eq!(parse_metadata("   "), None);
    }

    #[test]
    fn test_year_ignores_venue_name() {
        let meta = parse_metadata("A, ICML 2020 Workshop, 2022").expect("metadata");
        assert_eq!(meta.venue.as_deref(), Some("ICML 2020 Workshop, 2022"));
        assert_eq!(meta.year.as_deref(), Some("2022"));
    }

    #[test]
    fn test_metadata_single_segment() {
        let meta = parse_metadata("A Smith - arXiv 2021").expect("metadata");
        assert_eq!(meta.authors, Some(Vec::new()));
        assert_eq!(meta.venue.as_deref(), Some("A Smith - arXiv 2021"));
        assert_eq!(meta.year.as_deref(), Some("2021"));
    }

    #[test]
    fn test_year_rule() {
        assert_eq!(year_from("2021 - springer.com").as_deref(), Some("2021"));
        assert_eq!(year_from("Proc. 12th, 2003").as_deref(), Some("2003"));
        assert_eq!(year_from("x 20"), None);
        assert_eq!(year_from("1999"), None);
    }
}
