//! Search keyword expansion.

use std::collections::HashSet;

/// Fixed terms appended to every search so an empty profile still yields a
/// usable keyword set.
pub const SUPPLEMENTARY_TERMS: [&str; 3] = ["good first issue", "beginner friendly", "easy"];

/// Expand profile keywords, languages, and topics into the full search set:
/// the union of all three plus the supplementary terms, deduplicated
/// case-insensitively with first-seen order preserved.
pub fn expand(keywords: &[String], languages: &[String], topics: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for term in keywords
        .iter()
        .chain(languages)
        .chain(topics)
        .map(String::as_str)
        .chain(SUPPLEMENTARY_TERMS)
    {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }
        if seen.insert(term.to_lowercase()) {
            out.push(term.to_string());
        }
    }
    out
}
