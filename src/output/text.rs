//! Plain-text crawl report

use crate::output::traits::{CrawlReport, OutputResult, ReportSink};
use std::path::{Path, PathBuf};

/// Writes the report as a plain-text file, replacing any previous one
#[derive(Debug, Clone)]
pub struct TextReportSink {
    path: PathBuf,
}

impl TextReportSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ReportSink for TextReportSink {
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()> {
        std::fs::write(&self.path, format_report(report))?;
        tracing::info!("Crawl report written to {}", self.path.display());
        Ok(())
    }
}

/// Formats the report
///
/// # Example
///
/// ```
/// use sumi_sieve::output::{format_report, CrawlReport};
///
/// let text = format_report(&CrawlReport::default());
/// assert!(text.starts_with("Q1: 0 unique pages\n"));
/// ```
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Q1: {} unique pages\n\n", report.unique_pages));

    match &report.longest_page {
        Some(page) => out.push_str(&format!(
            "Q2: Longest page: {} with {} words\n\n",
            page.url, page.word_count
        )),
        None => out.push_str("Q2: Longest page: n/a with 0 words\n\n"),
    }

    out.push_str(&format!(
        "Top {} most common words:\n\n",
        crate::state::TOP_WORDS
    ));
    for (word, count) in &report.top_words {
        out.push_str(&format!("{}: {}\n", word, count));
    }

    out.push_str("\nSubdomains:\n\n");
    for (host, count) in &report.hosts {
        out.push_str(&format!("{}, {}\n", host, count));
    }

    out
}
