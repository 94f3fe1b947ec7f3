/// Title phrases marking a success response as an error page in disguise
pub const SOFT_404_PHRASES: &[&str] = &[
    "not found",
    "page not found",
    "404",
    "error",
    "page not available",
];

/// Returns true if the page title indicates a soft-404
///
/// The title is trimmed and lowercased; an absent or blank title never
/// counts.
pub fn is_soft_404(title: Option<&str>) -> bool {
    let Some(title) = title else {
        return false;
    };

    let title = title.trim().to_lowercase();
    if title.is_empty() {
        return false;
    }

    SOFT_404_PHRASES.iter().any(|phrase| title.contains(phrase))
}
