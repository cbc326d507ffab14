//! Snippet normalization helpers.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum characters kept for titles and snippets.
pub const SNIPPET_MAX_CHARS: usize = 600;

static HTML_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^<]+?>").ok());

/// Trim whitespace and cap at `limit` characters.
///
/// When truncated, the last kept character is replaced by `…` so the result is
/// exactly `limit` characters long.
pub fn trim_text(s: &str, limit: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= limit {
        return s.to_string();
    }

    let mut out: String = s.chars().take(limit.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Remove HTML tags (Wikipedia wraps matches in `<span class="searchmatch">`).
pub fn strip_html(s: &str) -> String {
    match HTML_TAG.as_ref() {
        Some(re) => re.replace_all(s, "").into_owned(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_pattern_compiles() {
        assert!(HTML_TAG.is_some());
    }

    #[test]
    fn test_trim_short_text_untouched() {
        assert_eq!(trim_text("  Zakat  ", 600), "Zakat");
    }

    #[test]
    fn test_trim_long_text_ends_with_ellipsis() {
        let long = "a".repeat(700);
        let trimmed = trim_text(&long, 600);
        assert_eq!(trimmed.chars().count(), 600);
        assert!(trimmed.ends_with('…'));
    }

    #[test]
    fn test_trim_counts_characters_not_bytes() {
        let arabic = "بسم الله ".repeat(100);
        let trimmed = trim_text(&arabic, 10);
        assert_eq!(trimmed.chars().count(), 10);
    }

    #[test]
    fn test_strip_html() {
        let raw = r#"The <span class="searchmatch">Battle</span> of Badr"#;
        assert_eq!(strip_html(raw), "The Battle of Badr");
    }
}
