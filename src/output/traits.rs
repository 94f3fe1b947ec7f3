//! Report sink trait and types
//!
//! This module defines the trait interface for report sinks and the crawl
//! report they receive.

use crate::state::LongestPage;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// End-of-crawl figures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Number of distinct accepted pages
    pub unique_pages: usize,

    /// Page with the most tokens, if any
    pub longest_page: Option<LongestPage>,

    /// Most frequent non-stopwords with their counts, most frequent first
    pub top_words: Vec<(String, usize)>,

    /// Accepted pages per in-scope host, sorted by host name
    pub hosts: Vec<(String, usize)>,
}

/// Destination for the crawl report
pub trait ReportSink {
    /// Writes one report
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()>;
}

/// Fans one report out to several sinks, stopping at the first failure
impl ReportSink for Vec<Box<dyn ReportSink>> {
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()> {
        self.iter().try_for_each(|sink| sink.write_report(report))
    }
}
