/// Shortest token kept by [`tokenize`]
pub const MIN_TOKEN_LEN: usize = 2;

/// Splits visible page text into lowercase alphabetic tokens
///
/// Any run of characters other than ASCII letters separates tokens; tokens
/// shorter than [`MIN_TOKEN_LEN`] are dropped. Order is preserved because
/// shingling depends on it.
///
/// # Examples
///
/// ```
/// use sumi_sieve::content::tokenize;
///
/// assert_eq!(tokenize("Hello, World! a 42nd"), vec!["hello", "world", "nd"]);
/// assert!(tokenize("").is_empty());
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|word| word.len() >= MIN_TOKEN_LEN)
        .map(|word| word.to_ascii_lowercase())
        .collect()
}
