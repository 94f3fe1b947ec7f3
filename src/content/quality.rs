//! Content quality filter
//!
//! Cheaply discards navigation-only, boilerplate-heavy, or pathologically
//! repetitive pages before any shingle hashing is done.

use crate::content::stopwords::is_stopword;
use std::collections::HashSet;
use std::fmt;

/// Pages with fewer tokens than this are rejected
pub const MIN_TOKENS: usize = 15;

/// Highest accepted share of stopword tokens
pub const MAX_STOPWORD_RATIO: f64 = 0.5;

/// Lowest accepted share of distinct tokens
pub const MIN_DISTINCT_RATIO: f64 = 0.04;

/// Why a page failed the quality filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QualityRejection {
    /// Fewer than [`MIN_TOKENS`] tokens
    TooShort { tokens: usize },

    /// Stopword share above [`MAX_STOPWORD_RATIO`]
    StopwordHeavy { ratio: f64 },

    /// Distinct-token share below [`MIN_DISTINCT_RATIO`]
    Repetitive { ratio: f64 },
}

impl fmt::Display for QualityRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { tokens } => write!(f, "too short ({} tokens)", tokens),
            Self::StopwordHeavy { ratio } => write!(f, "stopword heavy ({:.2})", ratio),
            Self::Repetitive { ratio } => write!(f, "repetitive ({:.3} distinct)", ratio),
        }
    }
}

/// Checks a token sequence against the fixed quality thresholds
///
/// Returns `Ok(())` when the page is worth keeping. This is a read-only
/// decision with no side effects.
pub fn check_quality(tokens: &[String]) -> Result<(), QualityRejection> {
    let total = tokens.len();
    if total < MIN_TOKENS {
        return Err(QualityRejection::TooShort { tokens: total });
    }

    let stopwords = tokens.iter().filter(|t| is_stopword(t)).count();
    let stopword_ratio = stopwords as f64 / total as f64;
    if stopword_ratio > MAX_STOPWORD_RATIO {
        return Err(QualityRejection::StopwordHeavy {
            ratio: stopword_ratio,
        });
    }

    let distinct = tokens.iter().map(String::as_str).collect::<HashSet<_>>().len();
    let distinct_ratio = distinct as f64 / total as f64;
    if distinct_ratio < MIN_DISTINCT_RATIO {
        return Err(QualityRejection::Repetitive {
            ratio: distinct_ratio,
        });
    }

    Ok(())
}
