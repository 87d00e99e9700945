//! Record output: pretty JSON, JSON lines or CSV.

use crate::error::Result;
use crate::extractor::Record;
use serde::Serialize;
use std::io::Write;

/// How records are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One indented JSON object per record
    Pretty,
    /// One compact JSON object per line
    Lines,
    /// CSV with a header row
    Csv,
}

/// Flat CSV row; authors joined with ",", missing values left empty
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    authors: Option<String>,
    publication_link: &'a str,
    citation_count: Option<u64>,
    pdf_link: &'a str,
    venue: Option<&'a str>,
    year: Option<&'a str>,
}

impl<'a> From<&'a Record> for CsvRow<'a> {
    fn from(r: &'a Record) -> Self {
        Self {
            title: &r.title,
            authors: r.authors.as_ref().map(|a| a.join(",")),
            publication_link: &r.publication_link,
            citation_count: r.citation_count,
            pdf_link: &r.pdf_link,
            venue: r.venue.as_deref(),
            year: r.year.as_deref(),
        }
    }
}

enum Sink<W: Write> {
    Json { out: W, pretty: bool },
    Csv(Box<csv::Writer<W>>),
}

/// Writes batches of records as they arrive.
pub struct RecordWriter<W: Write> {
    sink: Sink<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        let sink = match format {
            OutputFormat::Pretty => Sink::Json { out, pretty: true },
            OutputFormat::Lines => Sink::Json { out, pretty: false },
            OutputFormat::Csv => Sink::Csv(Box::new(
                csv::WriterBuilder::new()
                    .has_headers(true)
                    .from_writer(out),
            )),
        };
        Self { sink }
    }

    pub fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        match &mut self.sink {
            Sink::Json { out, pretty } => {
                for record in records {
                    if *pretty {
                        serde_json::to_writer_pretty(&mut *out, record)?;
                    } else {
                        serde_json::to_writer(&mut *out, record)?;
                    }
                    writeln!(out)?;
                }
                out.flush()?;
            }
            Sink::Csv(wtr) => {
                for record in records {
                    wtr.serialize(CsvRow::from(record))?;
                }
                wtr.flush()?;
            }
        }
        Ok(())
    }
}
