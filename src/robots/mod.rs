//! Robots.txt handling module
//!
//! This module fetches, parses and caches robots.txt files, and enforces
//! crawl-delay between visits to the same domain.

mod cache;
mod parser;

pub use cache::{DomainPolicy, PolitenessCache, PolitenessDecision};
pub use parser::{ParsedRobots, RobotsParseError};

use crate::crawler::Fetcher;
use std::time::Duration;

/// User-agent token robots.txt rules are evaluated for
pub const ROBOTS_AGENT: &str = "*";

/// What came of asking a domain for its robots.txt
///
/// Only `Parsed` carries rules. Every other outcome is permissive: all URLs
/// are allowed and no crawl-delay applies. The variants stay distinct so
/// callers can report why no policy was enforced.
#[derive(Debug, Clone)]
pub enum RobotsOutcome {
    /// robots.txt was retrieved and parsed
    Parsed(ParsedRobots),

    /// The server answered 404; the domain publishes no policy
    NotFound,

    /// Transport error, or a status other than 200 and 404
    FetchFailed(String),

    /// The body was retrieved but is not usable robots.txt
    ParseFailed(String),
}

impl RobotsOutcome {
    /// Returns the parsed rules, if any
    pub fn rules(&self) -> Option<&ParsedRobots> {
        match self {
            Self::Parsed(rules) => Some(rules),
            _ => None,
        }
    }

    /// Checks whether `url` may be fetched by agent `*`
    pub fn is_allowed(&self, url: &str) -> bool {
        self.rules()
            .map_or(true, |rules| rules.is_allowed(url, ROBOTS_AGENT))
    }

    /// Crawl-delay declared for agent `*`
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.rules()
            .and_then(|rules| rules.crawl_delay(ROBOTS_AGENT))
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Short label for logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parsed(_) => "parsed",
            Self::NotFound => "not-found",
            Self::FetchFailed(_) => "fetch-failed",
            Self::ParseFailed(_) => "parse-failed",
        }
    }
}

/// Fetches robots.txt for a domain
///
/// # Arguments
///
/// * `fetcher` - The fetch collaborator
/// * `domain` - Origin of the domain, e.g. `https://www.ics.uci.edu`
///
/// # Returns
///
/// The outcome of the fetch. This never fails: problems are folded into
/// [`RobotsOutcome::FetchFailed`] or [`RobotsOutcome::ParseFailed`].
pub async fn fetch_robots(fetcher: &dyn Fetcher, domain: &str) -> RobotsOutcome {
    let robots_url = format!("{}/robots.txt", domain.trim_end_matches('/'));

    let outcome = match fetcher.fetch(&robots_url).await {
        Ok(response) => match (response.status, response.body) {
            (200, Some(body)) => match ParsedRobots::parse(&body) {
                Ok(rules) => RobotsOutcome::Parsed(rules),
                Err(e) => RobotsOutcome::ParseFailed(e.to_string()),
            },
            (200, None) => RobotsOutcome::FetchFailed("empty response body".to_string()),
            (404, _) => RobotsOutcome::NotFound,
            (status, _) => RobotsOutcome::FetchFailed(format!("HTTP status {}", status)),
        },
        Err(e) => RobotsOutcome::FetchFailed(e.to_string()),
    };

    match &outcome {
        RobotsOutcome::Parsed(_) | RobotsOutcome::NotFound => {
            tracing::info!("robots.txt for {}: {}", domain, outcome.kind());
        }
        RobotsOutcome::FetchFailed(reason) | RobotsOutcome::ParseFailed(reason) => {
            tracing::warn!(
                "robots.txt for {}: {} ({}), allowing all",
                domain,
                outcome.kind(),
                reason
            );
        }
    }

    outcome
}
