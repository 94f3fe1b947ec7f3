/// Checks if a host falls under a domain suffix
///
/// The host matches when it equals the suffix or is any subdomain of it.
/// Matching is on label boundaries, so "evilics.uci.edu" does not match
/// "ics.uci.edu".
///
/// # Examples
///
/// ```
/// use sumi_sieve::url::matches_domain;
///
/// assert!(matches_domain("ics.uci.edu", "ics.uci.edu"));
/// assert!(matches_domain("ics.uci.edu", "www.ics.uci.edu"));
/// assert!(matches_domain("ics.uci.edu", "vision.ics.uci.edu"));
/// assert!(!matches_domain("ics.uci.edu", "evilics.uci.edu"));
/// ```
pub fn matches_domain(suffix: &str, host: &str) -> bool {
    match host.strip_suffix(suffix) {
        Some("") => true,
        Some(rest) => rest.ends_with('.'),
        None => false,
    }
}

/// Checks if a host counts toward the per-host report
///
/// Only the suffix itself or a host exactly one label below it counts, where
/// the label is made of word characters and hyphens.
pub fn matches_report_host(suffix: &str, host: &str) -> bool {
    match host.strip_suffix(suffix) {
        Some("") => true,
        Some(rest) => rest.strip_suffix('.').is_some_and(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        }),
        None => false,
    }
}
