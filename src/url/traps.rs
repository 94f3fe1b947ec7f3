//! Path and query heuristics for crawler traps
//!
//! These run after scope and robots checks. Each one guards against a family
//! of URLs that either are not HTML pages or enumerate an unbounded space
//! (calendars, commit logs, share links) on the same content.

use super::RejectReason;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static RE_NON_HTML_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\.(?:css|js|bmp|gif|jpe?g|ico|png|tiff?|mid|mp2|mp3|mp4|mpg|wav|avi|mov|mpeg|ram|m4v|mkv|ogg|ogv|pdf|ps|eps|tex|ppt|pptx|doc|docx|xls|xlsx|names|data|dat|exe|bz2|tar|msi|bin|7z|psd|dmg|iso|epub|dll|cnf|tgz|sha1|thmx|mso|arff|rtf|jar|csv|rm|smil|wmv|swf|wma|zip|rar|gz)$",
    )
    .unwrap()
});
static RE_DATE_SEGMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d{4}/\d{1,2}/\d{1,2}(?:/|$)").unwrap());
static RE_DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{8}").unwrap());
static RE_COMMIT_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/commit/[0-9a-f]{32,40}").unwrap());
static RE_EVENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/events?/").unwrap());
static RE_LOGIN_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:login|signin|sign-in|wp-login|user/login|auth)(?:/|$)").unwrap()
});
static RE_LOGIN_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|&)(?:login|signin)=|(?:^|&)action=login(?:&|$)").unwrap()
});

/// Path fragments of known trap spaces (image galleries, bibliographies)
const TRAP_PATH_FRAGMENTS: &[&str] = &["/pix", "/bibs/"];

/// Query parameters that only produce alternate views of a page
const TRAP_QUERY_PARAMS: &[&str] = &["version=", "from=", "share="];

/// Runs the trap heuristics on a parsed URL, in order
///
/// Returns the first matching reason, or `None` if the URL looks like a
/// regular page. Path and query are compared lowercased.
pub fn detect_trap(url: &Url) -> Option<RejectReason> {
    let path = url.path().to_lowercase();
    let query = url.query().unwrap_or_default().to_lowercase();

    if RE_NON_HTML_EXTENSION.is_match(&path) {
        return Some(RejectReason::NonHtmlExtension);
    }

    if RE_DATE_SEGMENTS.is_match(&path) || RE_DATE_TOKEN.is_match(&path) {
        return Some(RejectReason::DatePath);
    }

    if RE_COMMIT_HASH.is_match(&path) {
        return Some(RejectReason::CommitHash);
    }

    if RE_EVENTS.is_match(&path)
        || TRAP_PATH_FRAGMENTS
            .iter()
            .any(|fragment| path.contains(fragment))
    {
        return Some(RejectReason::TrapPath);
    }

    if TRAP_QUERY_PARAMS.iter().any(|param| query.contains(param))
        || (path.contains(".php") && query.contains("http"))
    {
        return Some(RejectReason::TrapQuery);
    }

    if RE_LOGIN_PATH.is_match(&path) || RE_LOGIN_QUERY.is_match(&query) {
        return Some(RejectReason::LoginPage);
    }

    None
}
