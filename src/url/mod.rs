//! URL handling module for Sumi-Sieve
//!
//! This module decides whether a candidate URL may be fetched. [`UrlFilter`]
//! runs the admissibility checks in a fixed order and stops at the first
//! failure:
//!
//! 1. scheme is `http` or `https`
//! 2. no `date=` anywhere in the URL
//! 3. host is in scope and not excluded
//! 4. robots.txt allows it, after waiting out any crawl-delay
//! 5. to 10. path and query trap heuristics (see [`detect_trap`])
//!
//! It also provides defragmentation and link resolution.

mod domain;
mod matcher;
mod normalize;
mod traps;

pub use domain::{extract_domain, policy_domain};
pub use matcher::{matches_domain, matches_report_host};
pub use normalize::{defragment, resolve_link};
pub use traps::detect_trap;

use crate::config::ScopeConfig;
use crate::robots::{PolitenessCache, PolitenessDecision};
use crate::UrlError;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Why a URL was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Scheme other than http or https
    UnsupportedScheme,
    /// `date=` appears in the URL
    CalendarQuery,
    /// Host is outside every allowed domain
    OutOfScope,
    /// Host is explicitly excluded
    ExcludedHost,
    /// robots.txt forbids the URL
    RobotsDisallowed,
    /// Path names a non-HTML file
    NonHtmlExtension,
    /// Path enumerates dates
    DatePath,
    /// Path is a version-control commit page
    CommitHash,
    /// Path is an events listing or a known trap space
    TrapPath,
    /// Query produces alternate views or embeds another URL
    TrapQuery,
    /// Login or sign-in endpoint
    LoginPage,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::UnsupportedScheme => "unsupported scheme",
            Self::CalendarQuery => "calendar query",
            Self::OutOfScope => "out of scope",
            Self::ExcludedHost => "excluded host",
            Self::RobotsDisallowed => "disallowed by robots.txt",
            Self::NonHtmlExtension => "non-HTML file extension",
            Self::DatePath => "date-based path",
            Self::CommitHash => "commit hash path",
            Self::TrapPath => "trap path",
            Self::TrapQuery => "trap query",
            Self::LoginPage => "login page",
        };
        f.write_str(reason)
    }
}

/// Decision of the admissibility filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Every check passed
    Admitted,
    /// The named check failed
    Rejected(RejectReason),
}

impl Admission {
    /// Returns true for [`Admission::Admitted`]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// URL admissibility filter
///
/// The only state it touches is the shared [`PolitenessCache`].
pub struct UrlFilter {
    allowed_domains: Vec<String>,
    excluded_hosts: Vec<String>,
    politeness: Arc<PolitenessCache>,
}

impl UrlFilter {
    /// Creates a filter for the configured scope
    pub fn new(scope: &ScopeConfig, politeness: Arc<PolitenessCache>) -> Self {
        Self {
            allowed_domains: scope
                .allowed_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            excluded_hosts: scope
                .excluded_hosts
                .iter()
                .map(|h| h.to_lowercase())
                .collect(),
            politeness,
        }
    }

    /// The politeness cache this filter consults
    pub fn politeness(&self) -> &Arc<PolitenessCache> {
        &self.politeness
    }

    /// Checks a host against the allowed domains and excluded hosts
    pub fn in_scope(&self, host: &str) -> Option<RejectReason> {
        if !self
            .allowed_domains
            .iter()
            .any(|suffix| matches_domain(suffix, host))
        {
            return Some(RejectReason::OutOfScope);
        }

        if self.excluded_hosts.iter().any(|excluded| excluded == host) {
            return Some(RejectReason::ExcludedHost);
        }

        None
    }

    /// Returns true if `host` counts toward the per-host report
    pub fn is_report_host(&self, host: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|suffix| matches_report_host(suffix, host))
    }

    /// Runs every admissibility check on `url`
    ///
    /// May wait for a domain's crawl-delay. Returns `Err` only when the URL
    /// cannot be parsed or has no host; callers should log and skip it.
    pub async fn admit(&self, url: &str) -> Result<Admission, UrlError> {
        let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Ok(Admission::Rejected(RejectReason::UnsupportedScheme));
        }

        if url.to_lowercase().contains("date=") {
            return Ok(Admission::Rejected(RejectReason::CalendarQuery));
        }

        let host = extract_domain(&parsed).ok_or(UrlError::MissingDomain)?;
        if let Some(reason) = self.in_scope(&host) {
            return Ok(Admission::Rejected(reason));
        }

        if self.politeness.check(&parsed).await == PolitenessDecision::Disallowed {
            return Ok(Admission::Rejected(RejectReason::RobotsDisallowed));
        }

        Ok(detect_trap(&parsed).map_or(Admission::Admitted, Admission::Rejected))
    }
}
