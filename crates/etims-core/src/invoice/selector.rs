//! Best-candidate selection.

use std::cmp::Ordering;

use crate::models::fields::ScoredCandidate;

/// Pick the best candidate: highest confidence, then leftmost span.
pub fn select(candidates: Vec<ScoredCandidate>) -> Option<ScoredCandidate> {
    candidates.into_iter().min_by(compare)
}

/// Ranking order used by [`select`]; `Less` means better.
pub fn compare(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.span().start.cmp(&b.span().start))
}
