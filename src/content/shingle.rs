//! Near-duplicate detection via hashed word shingles
//!
//! Each accepted page is fingerprinted as the set of 64-bit hashes of every
//! contiguous 4-token window. A new page is a near-duplicate when its set
//! overlaps any stored set by at least [`NEAR_DUPLICATE_THRESHOLD`]
//! (intersection over union).
//!
//! Phrase hashes use xxh3. Collisions are possible in principle, so this is
//! a probabilistic approximation rather than exact duplicate detection.

use std::collections::HashSet;
use xxhash_rust::xxh3::Xxh3;

/// Number of tokens per shingle
pub const SHINGLE_SIZE: usize = 4;

/// Overlap at or above which a page counts as a near-duplicate
pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.85;

/// Set of shingle hashes fingerprinting one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSignature {
    shingles: HashSet<u64>,
}

impl PageSignature {
    /// Builds the signature of a token sequence
    ///
    /// Returns `None` when there are fewer than [`SHINGLE_SIZE`] tokens; such
    /// pages are never considered duplicates and never registered.
    pub fn from_tokens(tokens: &[String]) -> Option<Self> {
        if tokens.len() < SHINGLE_SIZE {
            return None;
        }

        let shingles = tokens.windows(SHINGLE_SIZE).map(hash_shingle).collect();
        Some(Self { shingles })
    }

    /// Number of distinct shingle hashes
    pub fn len(&self) -> usize {
        self.shingles.len()
    }

    /// Returns true if the signature holds no hashes
    pub fn is_empty(&self) -> bool {
        self.shingles.is_empty()
    }

    /// Intersection-over-union of two signatures
    ///
    /// Defined as 0 when either signature is empty.
    pub fn overlap(&self, other: &PageSignature) -> f64 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }

        let (small, large) = if self.len() <= other.len() {
            (&self.shingles, &other.shingles)
        } else {
            (&other.shingles, &self.shingles)
        };

        let shared = small.iter().filter(|h| large.contains(h)).count();
        let union = self.len() + other.len() - shared;
        shared as f64 / union as f64
    }
}

/// Hashes one window of tokens, separating tokens so "ab c" != "a bc"
fn hash_shingle(window: &[String]) -> u64 {
    let mut hasher = Xxh3::new();
    for token in window {
        hasher.update(token.as_bytes());
        hasher.update(b" ");
    }
    hasher.digest()
}

/// Outcome of a near-duplicate lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DedupVerdict {
    /// No stored signature is close enough (or the page is too short to sign)
    Unique,

    /// Overlaps the stored signature at `index` by `overlap`
    NearDuplicate { index: usize, overlap: f64 },
}

impl DedupVerdict {
    /// Returns true for [`DedupVerdict::NearDuplicate`]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::NearDuplicate { .. })
    }
}

/// Append-only store of signatures for accepted pages
///
/// Lookup is a linear scan over every stored signature.
#[derive(Debug, Default)]
pub struct ShingleIndex {
    signatures: Vec<PageSignature>,
}

impl ShingleIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered signatures
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Returns true if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Finds the first stored signature overlapping `signature` at or above
    /// the threshold, without modifying the index
    pub fn find_near_duplicate(&self, signature: &PageSignature) -> DedupVerdict {
        self.signatures
            .iter()
            .enumerate()
            .map(|(index, stored)| (index, stored.overlap(signature)))
            .find(|(_, overlap)| *overlap >= NEAR_DUPLICATE_THRESHOLD)
            .map_or(DedupVerdict::Unique, |(index, overlap)| {
                DedupVerdict::NearDuplicate { index, overlap }
            })
    }

    /// Stores the signature of an accepted page
    pub fn register(&mut self, signature: PageSignature) {
        self.signatures.push(signature);
    }

    /// Checks a page and registers its signature only if it is unique
    ///
    /// A near-duplicate leaves the index unchanged. Pages too short to sign
    /// are reported unique and not registered.
    pub fn check_and_register(&mut self, tokens: &[String]) -> DedupVerdict {
        let Some(signature) = PageSignature::from_tokens(tokens) else {
            return DedupVerdict::Unique;
        };

        let verdict = self.find_near_duplicate(&signature);
        if !verdict.is_duplicate() {
            self.register(signature);
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tokenize;

    fn numbered(prefix: &str, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                // Letters only so the words survive tokenization
                let suffix: String = i
                    .to_string()
                    .chars()
                    .map(|d| (b'a' + d.to_digit(10).unwrap_or(0) as u8) as char)
                    .collect();
                format!("{}{}", prefix, suffix)
            })
            .collect()
    }

    #[test]
    fn test_short_sequences_have_no_signature() {
        let tokens = tokenize("only three words");
        assert!(PageSignature::from_tokens(&tokens).is_none());

        let mut index = ShingleIndex::new();
        assert_eq!(index.check_and_register(&tokens), DedupVerdict::Unique);
        assert!(index.is_empty());
    }

    #[test]
    fn test_signature_counts_distinct_windows() {
        let tokens = tokenize("one two three four five");
        let signature = PageSignature::from_tokens(&tokens).unwrap();
        assert_eq!(signature.len(), 2);

        let repeated = tokenize("la la la la la la");
        let signature = PageSignature::from_tokens(&repeated).unwrap();
        assert_eq!(signature.len(), 1);
    }

    #[test]
    fn test_token_boundaries_matter() {
        let a: Vec<String> = ["ab", "cd", "ef", "gh"].iter().map(|s| s.to_string()).collect();
        let b: Vec<String> = ["abc", "d", "ef", "gh"].iter().map(|s| s.to_string()).collect();
        let sa = PageSignature::from_tokens(&a).unwrap();
        let sb = PageSignature::from_tokens(&b).unwrap();
        assert_eq!(sa.overlap(&sb), 0.0);
    }

    #[test]
    fn test_identical_pages_overlap_fully() {
        let tokens = numbered("word", 40);
        let signature = PageSignature::from_tokens(&tokens).unwrap();
        assert_eq!(signature.overlap(&signature.clone()), 1.0);
    }

    #[test]
    fn test_disjoint_pages_both_retained() {
        let first = numbered("alpha", 30);
        let second = numbered("omega", 30);

        let sa = PageSignature::from_tokens(&first).unwrap();
        let sb = PageSignature::from_tokens(&second).unwrap();
        assert_eq!(sa.overlap(&sb), 0.0);

        let mut index = ShingleIndex::new();
        assert_eq!(index.check_and_register(&first), DedupVerdict::Unique);
        assert_eq!(index.check_and_register(&second), DedupVerdict::Unique);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_near_duplicate_rejected_and_not_stored() {
        let baseline = numbered("word", 100);
        let mut tweaked = baseline.clone();
        tweaked[99] = "different".to_string();

        let sa = PageSignature::from_tokens(&baseline).unwrap();
        let sb = PageSignature::from_tokens(&tweaked).unwrap();
        // 96 shared windows out of 98 in the union
        assert!(sa.overlap(&sb) >= NEAR_DUPLICATE_THRESHOLD);

        let mut index = ShingleIndex::new();
        assert_eq!(index.check_and_register(&baseline), DedupVerdict::Unique);

        let verdict = index.check_and_register(&tweaked);
        assert!(matches!(
            verdict,
            DedupVerdict::NearDuplicate { index: 0, .. }
        ));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_partial_overlap_below_threshold_accepted() {
        let baseline = numbered("word", 40);
        let mut half = baseline[..20].to_vec();
        half.extend(numbered("fresh", 20));

        let mut index = ShingleIndex::new();
        index.check_and_register(&baseline);
        assert_eq!(index.check_and_register(&half), DedupVerdict::Unique);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_find_does_not_mutate() {
        let tokens = numbered("word", 10);
        let signature = PageSignature::from_tokens(&tokens).unwrap();

        let mut index = ShingleIndex::new();
        index.register(signature.clone());
        assert!(index.find_near_duplicate(&signature).is_duplicate());
        assert!(index.find_near_duplicate(&signature).is_duplicate());
        assert_eq!(index.len(), 1);
    }
}
