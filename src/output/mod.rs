//! Output module for crawl reports
//!
//! This module handles:
//! - The end-of-crawl report model
//! - Writing it as a plain-text file
//! - Recording it in a SQLite database

mod sqlite_output;
mod text;
mod traits;

pub use sqlite_output::{load_latest_report, SqliteReportSink, StoredReport, REPORT_SCHEMA_SQL};
pub use text::{format_report, TextReportSink};
pub use traits::{CrawlReport, OutputError, OutputResult, ReportSink};
