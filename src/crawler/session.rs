//! Crawl session
//!
//! A [`CrawlSession`] owns every piece of mutable crawl state: the politeness
//! cache (through its [`UrlFilter`]), the shingle signatures and the crawl
//! statistics. It is created at crawl start, shared by reference with every
//! page-processing call, and consumed by [`CrawlSession::finish`].

use crate::config::{Config, ScopeConfig};
use crate::content::{
    check_quality, is_soft_404, tokenize, DedupVerdict, PageSignature, QualityRejection,
    ShingleIndex,
};
use crate::crawler::{DocumentParser, Fetcher, HtmlParser, HttpFetcher, PageResponse};
use crate::output::{CrawlReport, ReportSink};
use crate::robots::PolitenessCache;
use crate::state::{CrawlStats, TOP_WORDS};
use crate::url::{defragment, resolve_link, Admission, UrlFilter};
use crate::{SieveError, UrlError};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

/// Why a fetched page contributed nothing
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Status other than 200
    BadStatus(u16),

    /// No body, or an empty one
    EmptyBody,

    /// The DOM collaborator could not parse the body
    Unparsable(String),

    /// Failed the content quality filter
    LowQuality(QualityRejection),

    /// Too similar to an accepted page
    NearDuplicate { overlap: f64 },

    /// Title marks the page as an error page
    SoftNotFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadStatus(status) => write!(f, "HTTP status {}", status),
            Self::EmptyBody => f.write_str("empty body"),
            Self::Unparsable(message) => write!(f, "unparsable document: {}", message),
            Self::LowQuality(rejection) => write!(f, "low quality: {}", rejection),
            Self::NearDuplicate { overlap } => {
                write!(f, "near-duplicate ({:.0}% overlap)", overlap * 100.0)
            }
            Self::SoftNotFound => f.write_str("soft 404"),
        }
    }
}

/// Outcome of running one page through the content pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum PageVerdict {
    Accepted,
    Skipped(SkipReason),
}

impl PageVerdict {
    /// Returns true for [`PageVerdict::Accepted`]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Result of [`CrawlSession::process_page`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedPage {
    /// Defragmented requested URL
    pub url: String,

    pub verdict: PageVerdict,

    /// Total tokens on the page, stopwords included (0 if never tokenized)
    pub token_count: usize,

    /// Absolute, defragmented, de-duplicated outbound links; empty unless
    /// the page was accepted
    pub links: Vec<String>,
}

impl ProcessedPage {
    fn skipped(url: String, reason: SkipReason, token_count: usize) -> Self {
        Self {
            url,
            verdict: PageVerdict::Skipped(reason),
            token_count,
            links: Vec::new(),
        }
    }
}

/// State that must change together when a page is accepted
#[derive(Debug, Default)]
struct Corpus {
    signatures: ShingleIndex,
    stats: CrawlStats,
}

/// The decision core of one crawl
pub struct CrawlSession {
    filter: UrlFilter,
    parser: Arc<dyn DocumentParser>,
    corpus: Mutex<Corpus>,
}

impl CrawlSession {
    /// Creates a session for `scope`
    ///
    /// `fetcher` is used only to retrieve robots.txt.
    pub fn new(
        scope: &ScopeConfig,
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn DocumentParser>,
    ) -> Self {
        let politeness = Arc::new(PolitenessCache::new(fetcher));
        Self {
            filter: UrlFilter::new(scope, politeness),
            parser,
            corpus: Mutex::new(Corpus::default()),
        }
    }

    /// Creates a session with the HTTP fetcher and HTML parser
    pub fn from_config(config: &Config) -> Result<Self, SieveError> {
        let fetcher = HttpFetcher::new(&config.user_agent, &config.fetch)?;
        Ok(Self::new(
            &config.scope,
            Arc::new(fetcher),
            Arc::new(HtmlParser),
        ))
    }

    fn corpus(&self) -> MutexGuard<'_, Corpus> {
        self.corpus.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The admissibility filter of this session
    pub fn filter(&self) -> &UrlFilter {
        &self.filter
    }

    /// Runs a fetched page through the content pipeline
    ///
    /// Status and body checks, parsing, tokenizing and the quality filter
    /// run without any lock. The near-duplicate check, soft-404 check,
    /// signature registration and stats update then run as one step under
    /// the corpus lock, so concurrent pages never interleave there.
    ///
    /// A soft-404 page is rejected before its signature is registered, so
    /// error pages never make later pages look like duplicates.
    pub fn process_page(&self, response: &PageResponse) -> ProcessedPage {
        let url = defragment(&response.requested_url).to_string();

        if response.status != 200 {
            tracing::debug!("Skipping {}: HTTP status {}", url, response.status);
            return ProcessedPage::skipped(url, SkipReason::BadStatus(response.status), 0);
        }

        let Some(body) = response.body.as_deref().filter(|b| !b.is_empty()) else {
            tracing::debug!("Skipping {}: empty body", url);
            return ProcessedPage::skipped(url, SkipReason::EmptyBody, 0);
        };

        let document = match self.parser.parse(body) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", url, e);
                return ProcessedPage::skipped(url, SkipReason::Unparsable(e.to_string()), 0);
            }
        };

        let tokens = tokenize(&document.text);
        let token_count = tokens.len();

        if let Err(rejection) = check_quality(&tokens) {
            tracing::debug!("Skipping {}: {}", url, rejection);
            return ProcessedPage::skipped(url, SkipReason::LowQuality(rejection), token_count);
        }

        {
            let mut corpus = self.corpus();
            let signature = PageSignature::from_tokens(&tokens);

            if let Some(signature) = &signature {
                if let DedupVerdict::NearDuplicate { overlap, .. } =
                    corpus.signatures.find_near_duplicate(signature)
                {
                    tracing::debug!("Skipping {}: near-duplicate ({:.2})", url, overlap);
                    return ProcessedPage::skipped(
                        url,
                        SkipReason::NearDuplicate { overlap },
                        token_count,
                    );
                }
            }

            if is_soft_404(document.title.as_deref()) {
                tracing::debug!("Skipping {}: soft 404 ({:?})", url, document.title);
                return ProcessedPage::skipped(url, SkipReason::SoftNotFound, token_count);
            }

            if let Some(signature) = signature {
                corpus.signatures.register(signature);
            }
            corpus.stats.record_page(&url, &tokens);
        }

        let links = resolve_links(response, &document.links);
        tracing::info!(
            "Accepted {} ({} tokens, {} links)",
            url,
            token_count,
            links.len()
        );

        ProcessedPage {
            url,
            verdict: PageVerdict::Accepted,
            token_count,
            links,
        }
    }

    /// Runs the admissibility filter on one URL
    ///
    /// May wait for the domain's crawl-delay.
    pub async fn admit(&self, url: &str) -> Result<Admission, UrlError> {
        self.filter.admit(url).await
    }

    /// Processes a page and returns the outbound links worth following
    ///
    /// Links already in the visited set are dropped without an admissibility
    /// check. Unparsable links are logged and skipped.
    pub async fn scrape(&self, response: &PageResponse) -> Vec<String> {
        let page = self.process_page(response);
        let mut admitted = Vec::new();

        for link in page.links {
            if self.is_visited(&link) {
                continue;
            }

            match self.filter.admit(&link).await {
                Ok(Admission::Admitted) => admitted.push(link),
                Ok(Admission::Rejected(reason)) => {
                    tracing::debug!("Rejected {}: {}", link, reason);
                }
                Err(e) => {
                    tracing::warn!("Skipping link from {}: {}", page.url, e);
                }
            }
        }

        admitted
    }

    /// Returns true if the URL (ignoring its fragment) was accepted
    pub fn is_visited(&self, url: &str) -> bool {
        self.corpus().stats.is_visited(url)
    }

    /// Number of stored page signatures
    pub fn signature_count(&self) -> usize {
        self.corpus().signatures.len()
    }

    /// Snapshot of the crawl-wide aggregates
    pub fn report(&self) -> CrawlReport {
        let corpus = self.corpus();
        let stats = &corpus.stats;

        CrawlReport {
            unique_pages: stats.unique_pages(),
            longest_page: stats.longest_page().cloned(),
            top_words: stats.top_words(TOP_WORDS),
            hosts: stats
                .host_counts(|host| self.filter.is_report_host(host))
                .into_iter()
                .collect(),
        }
    }

    /// Ends the crawl and writes the final report to `sink`
    pub fn finish(self, sink: &dyn ReportSink) -> Result<CrawlReport, SieveError> {
        let report = self.report();
        sink.write_report(&report)?;
        tracing::info!(
            "Crawl finished: {} unique pages, {} hosts",
            report.unique_pages,
            report.hosts.len()
        );
        Ok(report)
    }
}

/// Resolves raw hrefs against the page URL, keeping first occurrences
fn resolve_links(response: &PageResponse, hrefs: &[String]) -> Vec<String> {
    let Some(base) = Url::parse(&response.final_url)
        .or_else(|_| Url::parse(&response.requested_url))
        .ok()
    else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    hrefs
        .iter()
        .filter_map(|href| resolve_link(href, &base))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
