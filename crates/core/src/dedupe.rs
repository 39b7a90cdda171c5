//! Candidate deduplication by canonical issue URL.

use crate::models::Candidate;
use std::collections::HashSet;

/// Collapse candidates fetched under multiple keywords into a unique set
/// keyed by issue URL. The first-seen instance wins and output order follows
/// input order.
pub fn dedupe_by_url(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if seen.insert(candidate.url.clone()) {
            out.push(candidate);
        }
    }
    out
}
