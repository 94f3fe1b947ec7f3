use crate::content::is_stopword;
use crate::url::{defragment, extract_domain};
use std::collections::{BTreeMap, HashMap, HashSet};
use url::Url;

/// Number of words listed in the crawl report
pub const TOP_WORDS: usize = 50;

/// The page with the most tokens seen so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestPage {
    /// Defragmented URL of the page
    pub url: String,

    /// Total token count, stopwords included
    pub word_count: usize,
}

/// Occurrence count of one word, with the order it was first seen in
#[derive(Debug, Clone, Copy)]
struct WordTally {
    count: usize,
    first_seen: usize,
}

/// Crawl-wide aggregates over accepted pages
///
/// Only pages that passed every content filter are recorded. Everything here
/// grows monotonically for the life of the crawl.
#[derive(Debug, Default)]
pub struct CrawlStats {
    /// Defragmented URLs of accepted pages
    visited: HashSet<String>,

    /// Non-stopword frequencies across accepted pages
    words: HashMap<String, WordTally>,

    /// Next first-seen sequence number
    next_word: usize,

    longest: Option<LongestPage>,
}

impl CrawlStats {
    /// Creates empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted page
    ///
    /// The URL is defragmented before it is added to the visited set. Word
    /// counts are merged for non-stopwords only, while the longest-page
    /// comparison uses the full token count and replaces the record only on
    /// a strict increase.
    pub fn record_page(&mut self, url: &str, tokens: &[String]) {
        let url = defragment(url);
        self.visited.insert(url.to_string());

        for token in tokens.iter().filter(|t| !is_stopword(t)) {
            match self.words.get_mut(token) {
                Some(tally) => tally.count += 1,
                None => {
                    self.words.insert(
                        token.clone(),
                        WordTally {
                            count: 1,
                            first_seen: self.next_word,
                        },
                    );
                    self.next_word += 1;
                }
            }
        }

        let best = self.longest.as_ref().map_or(0, |page| page.word_count);
        if tokens.len() > best {
            self.longest = Some(LongestPage {
                url: url.to_string(),
                word_count: tokens.len(),
            });
        }
    }

    /// Returns true if the URL (ignoring its fragment) was accepted
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(defragment(url))
    }

    /// Number of distinct accepted pages
    pub fn unique_pages(&self) -> usize {
        self.visited.len()
    }

    /// The longest accepted page, if any page had tokens
    pub fn longest_page(&self) -> Option<&LongestPage> {
        self.longest.as_ref()
    }

    /// Cumulative count of a word
    pub fn word_count(&self, word: &str) -> usize {
        self.words.get(word).map_or(0, |tally| tally.count)
    }

    /// The `n` most frequent words
    ///
    /// Sorted by count, highest first. Words with equal counts keep the
    /// order in which they were first seen during the crawl.
    pub fn top_words(&self, n: usize) -> Vec<(String, usize)> {
        let mut words: Vec<(&String, &WordTally)> = self.words.iter().collect();
        words.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then(a.first_seen.cmp(&b.first_seen))
        });

        words
            .into_iter()
            .take(n)
            .map(|(word, tally)| (word.clone(), tally.count))
            .collect()
    }

    /// Accepted pages per host, for hosts accepted by `include`
    pub fn host_counts(&self, include: impl Fn(&str) -> bool) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();

        for url in &self.visited {
            let Some(host) = Url::parse(url).ok().as_ref().and_then(extract_domain) else {
                continue;
            };
            if include(&host) {
                *counts.entry(host).or_insert(0) += 1;
            }
        }

        counts
    }
}
