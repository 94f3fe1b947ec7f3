//! State module for crawl-wide aggregates
//!
//! [`CrawlStats`] holds the visited set, word frequencies and longest-page
//! record of accepted pages, and produces the figures for the crawl report.

mod stats;

pub use stats::{CrawlStats, LongestPage, TOP_WORDS};
