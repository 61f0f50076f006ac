//! Ordering, tie-breaking, and deduplication of scored candidates.

use crate::types::Candidate;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Orders candidates by enhanced score and removes duplicates.
///
/// Tie-break chain, fully specified so float ties never depend on a sort's
/// incidental stability: enhanced score descending, then original store
/// rank ascending (earlier raw result wins), then chunk id lexical.
#[derive(Default)]
pub struct ResultReranker;

impl ResultReranker {
    pub fn new() -> Self {
        Self
    }

    /// Rerank candidates: strictly descending by enhanced score, then
    /// dedup by chunk id and by whitespace-normalized content. The
    /// highest-scoring duplicate survives. Duplicate ids occur when a
    /// filtered and an unfiltered search are merged upstream; duplicate
    /// content defends against the same passage indexed under two ids.
    pub fn rerank(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(compare_candidates);

        let mut seen_ids = HashSet::new();
        let mut seen_content = HashSet::new();
        candidates
            .into_iter()
            .filter(|c| {
                // Sorted descending, so the first occurrence is the winner.
                seen_ids.insert(c.chunk_id.clone())
                    && seen_content.insert(normalize_content(&c.content))
            })
            .collect()
    }
}

fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.enhanced_score
        .partial_cmp(&a.enhanced_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.store_rank.cmp(&b.store_rank))
        .then_with(|| a.chunk_id.cmp(&b.chunk_id))
}

/// Collapse all whitespace runs so trivially reformatted copies of the
/// same passage compare equal
fn normalize_content(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}
