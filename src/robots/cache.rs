//! Politeness cache
//!
//! One [`DomainPolicy`] per origin, created on first contact by fetching
//! robots.txt and kept for the life of the crawl. Each entry sits behind its
//! own async mutex so that the robots fetch, the permission check, the
//! crawl-delay wait and the visit stamp happen as one step per domain, while
//! a worker sleeping on one domain never holds up another.

use crate::crawler::Fetcher;
use crate::robots::{fetch_robots, RobotsOutcome};
use crate::url::policy_domain;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Cached robots.txt outcome and visit clock for one domain
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    /// Origin the policy applies to (`scheme://host[:port]`)
    pub domain: String,

    /// What the robots.txt fetch produced
    pub robots: RobotsOutcome,

    /// Last time a request to this domain was cleared
    pub last_visit: Instant,
}

impl DomainPolicy {
    fn new(domain: &str, robots: RobotsOutcome) -> Self {
        Self {
            domain: domain.to_string(),
            robots,
            last_visit: Instant::now(),
        }
    }

    /// Time left before the crawl-delay since the last visit has passed
    fn remaining_delay(&self) -> Duration {
        self.robots
            .crawl_delay()
            .map_or(Duration::ZERO, |delay| {
                delay.saturating_sub(self.last_visit.elapsed())
            })
    }
}

/// Outcome of a politeness check for one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolitenessDecision {
    /// robots.txt permits the URL; the caller waited `waited` for crawl-delay
    Allowed { waited: Duration },

    /// robots.txt forbids the URL
    Disallowed,
}

impl PolitenessDecision {
    /// Returns true for [`PolitenessDecision::Allowed`]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

type PolicySlot = Arc<tokio::sync::Mutex<Option<DomainPolicy>>>;

/// Per-domain robots.txt permissions and crawl-delay enforcement
pub struct PolitenessCache {
    fetcher: Arc<dyn Fetcher>,
    domains: Mutex<HashMap<String, PolicySlot>>,
}

impl PolitenessCache {
    /// Creates an empty cache that fetches robots.txt through `fetcher`
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            domains: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the slot for `domain`, creating an empty one on first use
    ///
    /// The map lock is held only long enough to clone the slot handle.
    fn slot(&self, domain: &str) -> PolicySlot {
        let mut domains = self
            .domains
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(domains.entry(domain.to_string()).or_default())
    }

    /// Fills an empty slot by fetching robots.txt
    async fn load<'a>(
        &self,
        domain: &str,
        slot: &'a mut Option<DomainPolicy>,
    ) -> &'a mut DomainPolicy {
        if let Some(policy) = slot.take() {
            return slot.insert(policy);
        }

        let robots = fetch_robots(self.fetcher.as_ref(), domain).await;
        slot.insert(DomainPolicy::new(domain, robots))
    }

    /// Returns the policy for `domain`, fetching robots.txt on first access
    ///
    /// Concurrent first accesses to the same domain fetch robots.txt once.
    pub async fn get_or_fetch_policy(&self, domain: &str) -> DomainPolicy {
        let slot = self.slot(domain);
        let mut guard = slot.lock().await;
        self.load(domain, &mut guard).await.clone()
    }

    /// Checks robots.txt permission for `url` under agent `*`
    ///
    /// Does not wait or record a visit.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let domain = policy_domain(url);
        self.get_or_fetch_policy(&domain)
            .await
            .robots
            .is_allowed(url.as_str())
    }

    /// Waits out the crawl-delay for `domain`, then records a visit
    ///
    /// Returns how long the caller was held.
    pub async fn enforce_crawl_delay(&self, domain: &str) -> Duration {
        let slot = self.slot(domain);
        let mut guard = slot.lock().await;
        let policy = self.load(domain, &mut guard).await;
        wait_and_stamp(policy).await
    }

    /// Permission check and crawl-delay enforcement as one step
    ///
    /// A disallowed URL neither waits nor records a visit. An allowed one
    /// waits until the crawl-delay since the previous visit has passed and
    /// then stamps the visit time, all while holding only this domain's lock.
    /// `last_visit` therefore records cleared requests only, not every check.
    pub async fn check(&self, url: &Url) -> PolitenessDecision {
        let domain = policy_domain(url);
        let slot = self.slot(&domain);
        let mut guard = slot.lock().await;
        let policy = self.load(&domain, &mut guard).await;

        if !policy.robots.is_allowed(url.as_str()) {
            tracing::debug!("robots.txt disallows {}", url);
            return PolitenessDecision::Disallowed;
        }

        let waited = wait_and_stamp(policy).await;
        PolitenessDecision::Allowed { waited }
    }

    /// Domains with a cached policy, sorted
    pub fn cached_domains(&self) -> Vec<String> {
        let domains = self
            .domains
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = domains.keys().cloned().collect();
        names.sort();
        names
    }
}

async fn wait_and_stamp(policy: &mut DomainPolicy) -> Duration {
    let remaining = policy.remaining_delay();
    if !remaining.is_zero() {
        tracing::debug!(
            "Crawl-delay for {}: waiting {:?}",
            policy.domain,
            remaining
        );
        tokio::time::sleep(remaining).await;
    }
    policy.last_visit = Instant::now();
    remaining
}
