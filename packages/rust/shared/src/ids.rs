//! Slug and identifier helpers.

use std::sync::LazyLock;

use regex::Regex;

/// Canonical slug of a title: lowercased, spaces replaced by hyphens.
///
/// Used for chapter file names, the master document file name and chapter
/// uniqueness checks. Deliberately minimal: punctuation is kept, so
/// `"What's new"` becomes `"what's-new"`.
pub fn slug(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// Display identifier derived from free text.
///
/// Trims, lowercases, drops everything that is not an ASCII letter, digit or
/// whitespace, then collapses whitespace runs into a single hyphen.
pub fn document_id(text: &str) -> String {
    static DISALLOWED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid regex"));
    static WHITESPACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let lowered = text.trim().to_lowercase();
    let cleaned = DISALLOWED_RE.replace_all(&lowered, "");
    WHITESPACE_RE.replace_all(&cleaned, "-").into_owned()
}
