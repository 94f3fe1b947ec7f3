use url::Url;

/// Link prefixes that never lead to a crawlable page
const SKIPPED_LINK_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Strips the fragment identifier from a URL
///
/// Everything from the first `#` on is removed. The result never contains a
/// `#`, so applying this twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use sumi_sieve::url::defragment;
///
/// assert_eq!(defragment("https://ics.uci.edu/a#top"), "https://ics.uci.edu/a");
/// assert_eq!(defragment("https://ics.uci.edu/a"), "https://ics.uci.edu/a");
/// ```
pub fn defragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(before, _)| before)
}

/// Resolves an `href` found on a page into an absolute, defragmented URL
///
/// Returns `None` for hrefs that do not name another page: empty values,
/// same-page anchors, and `javascript:`, `mailto:`, `tel:` or `data:` links,
/// or values that cannot be joined to `base`.
pub fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_LINK_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return None;
    }

    let joined = base.join(href).ok()?;
    Some(defragment(joined.as_str()).to_string())
}
