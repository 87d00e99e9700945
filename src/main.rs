//! scholar-crawler - stream Google Scholar results as structured records
//!
//! ## Usage
//!
//! ```bash
//! scholar-crawler --query "machine learning" --max 50 --min-year 2020
//! GOOGLE_SCHOLAR_QUERY="landslide" scholar-crawler --max 20 --min-year 2018 --format lines
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use scholar_crawler::output::{OutputFormat, RecordWriter};
use scholar_crawler::{CrawlSession, HttpFetcher, RandomDelay, ScholarOptions, SearchQuery};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Crawl Google Scholar results for a query
#[derive(Parser)]
#[command(name = "scholar-crawler")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Query to search for
    #[arg(long, env = "GOOGLE_SCHOLAR_QUERY")]
    query: String,

    /// Stop after at least this many records (the last page is never cut short)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max: u64,

    /// Only include results from this year onwards
    #[arg(long)]
    min_year: i32,

    /// Output format
    #[arg(long, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Write records to this file instead of stdout (CSV defaults to a timestamped file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Mirror site URL
    #[arg(long)]
    base_url: Option<String>,

    /// Interface language (hl); selects the "cited by" phrase
    #[arg(long, default_value = "en")]
    lang: String,

    /// Proxy URL (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    proxy: Option<String>,

    /// Minimum delay between pages in milliseconds
    #[arg(long, default_value = "1000")]
    min_delay_ms: u64,

    /// Maximum delay between pages in milliseconds
    #[arg(long, default_value = "3000")]
    max_delay_ms: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug, cli.log_json);

    if cli.query.trim().is_empty() {
        anyhow::bail!("--query is required when GOOGLE_SCHOLAR_QUERY is not set");
    }

    let mut options = ScholarOptions {
        language: cli.lang.clone(),
        proxy: cli.proxy.clone(),
        min_delay: Duration::from_millis(cli.min_delay_ms),
        max_delay: Duration::from_millis(cli.max_delay_ms),
        ..Default::default()
    };
    if let Some(base_url) = cli.base_url.clone() {
        options.base_url = base_url;
    }

    let out: Box<dyn Write> = match output_path(&cli) {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            info!(path = %path.display(), "Writing records to file");
            Box::new(std::io::BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = RecordWriter::new(out, cli.format);

    let fetcher = HttpFetcher::new(&options).context("Failed to build HTTP client")?;
    let delay = RandomDelay::new(options.min_delay, options.max_delay)?;
    let query = SearchQuery::new(cli.query.trim(), cli.min_year);
    let max_records = usize::try_from(cli.max).context("--max is too large")?;

    let mut session = CrawlSession::new(fetcher, delay, query, options, max_records)?;
    let stats = session
        .run(|batch| writer.write_batch(batch))
        .await
        .context("Crawl failed")?;

    info!(
        pages = stats.pages,
        records = stats.emitted,
        discarded = stats.discarded,
        "Done"
    );
    Ok(())
}

/// Logs go to stderr so stdout carries records only.
fn init_logging(debug: bool, json: bool) {
    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Explicit `--output`, or a timestamped file for CSV.
fn output_path(cli: &Cli) -> Option<PathBuf> {
    if let Some(path) = &cli.output {
        return Some(path.clone());
    }
    if cli.format != OutputFormat::Csv {
        return None;
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    Some(PathBuf::from(format!(
        "{}_{}.csv",
        timestamp,
        safe_file_stem(&cli.query)
    )))
}

fn safe_file_stem(query: &str) -> String {
    query
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}
