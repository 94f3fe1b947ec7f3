//! Page content analysis
//!
//! This module turns visible page text into tokens and decides whether a page
//! is worth keeping:
//! - Tokenization into lowercase alphabetic words
//! - Quality filtering on token statistics
//! - Near-duplicate detection via word shingles
//! - Soft-404 detection from the page title

mod quality;
mod shingle;
mod soft404;
mod stopwords;
mod tokenizer;

pub use quality::{
    check_quality, QualityRejection, MAX_STOPWORD_RATIO, MIN_DISTINCT_RATIO, MIN_TOKENS,
};
pub use shingle::{
    DedupVerdict, PageSignature, ShingleIndex, NEAR_DUPLICATE_THRESHOLD, SHINGLE_SIZE,
};
pub use soft404::{is_soft_404, SOFT_404_PHRASES};
pub use stopwords::{is_stopword, STOPWORDS};
pub use tokenizer::{tokenize, MIN_TOKEN_LEN};
