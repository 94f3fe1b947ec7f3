use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (`mailto:` and similar), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sieve::url::extract_domain;
///
/// let url = Url::parse("https://WWW.ICS.UCI.EDU/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.ics.uci.edu".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the key politeness state is tracked under
///
/// This is the URL's origin, `scheme://host[:port]`, so `http` and `https`
/// on the same host are separate domains, as are different ports.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sieve::url::policy_domain;
///
/// let url = Url::parse("https://www.ics.uci.edu/about/index.html").unwrap();
/// assert_eq!(policy_domain(&url), "https://www.ics.uci.edu");
/// ```
pub fn policy_domain(url: &Url) -> String {
    url.origin().ascii_serialization()
}
