//! Crawler module for page processing
//!
//! This module contains the crawl pipeline and its collaborators:
//! - HTTP fetching (used for robots.txt and by the command-line driver)
//! - HTML parsing into visible text, title and links
//! - The crawl session that ties content analysis, link admission and
//!   crawl statistics together

mod fetcher;
mod parser;
mod session;

pub use fetcher::{build_http_client, Fetcher, HttpFetcher, PageResponse};
pub use parser::{parse_html, DocumentParser, HtmlParser, ParsedDocument};
pub use session::{CrawlSession, PageVerdict, ProcessedPage, SkipReason};

#[cfg(test)]
pub(crate) use fetcher::testing;
