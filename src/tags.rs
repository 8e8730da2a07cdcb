//! Comma-separated tag parsing

/// Split a comma-separated tag string, trimming whitespace and dropping
/// empty items. Input order is preserved.
#[must_use]
pub fn split_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
