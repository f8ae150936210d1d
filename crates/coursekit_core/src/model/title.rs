//! Title normalization shared by courses and lessons.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Trims and collapses internal whitespace runs to single spaces.
///
/// Returns `None` when nothing is left.
pub fn normalize_title(value: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.into_owned())
}

/// Case-folded search key stored next to course titles.
///
/// Uses full Unicode lowercasing so substring filters match `É` against `é`,
/// which SQLite's ASCII-only `LIKE` folding cannot do.
pub fn title_search_key(title: &str) -> String {
    title.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, title_search_key};

    #[test]
    fn normalize_collapses_inner_whitespace() {
        assert_eq!(
            normalize_title("  Intro \t to\n\nRust  ").as_deref(),
            Some("Intro to Rust")
        );
    }

    #[test]
    fn normalize_rejects_blank() {
        assert_eq!(normalize_title(" \n\t "), None);
        assert_eq!(normalize_title(""), None);
    }

    #[test]
    fn search_key_folds_unicode_case() {
        assert_eq!(title_search_key("ÉCOLE Rust"), "école rust");
    }
}
