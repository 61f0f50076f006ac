//! Consolidates reranked candidates into a single bounded context block
//! with per-chunk attribution.

use crate::errors::{RetrievalError, Result};
use crate::types::{Candidate, ConsolidatedContext, RelevanceTier, SourceRef};
use std::collections::BTreeMap;

/// Section headers by relevance tier, emitted in this order
const TIER_SECTIONS: &[(RelevanceTier, &str)] = &[
    (RelevanceTier::High, "=== PRIMARY INFORMATION ==="),
    (RelevanceTier::Medium, "=== SUPPORTING INFORMATION ==="),
    (RelevanceTier::Low, "=== REFERENCE INFORMATION ==="),
];

/// Separator between chunks so the answer-generation collaborator can
/// distinguish source boundaries
const CHUNK_DELIMITER: &str = "\n\n";

/// Maximum excerpt length carried in a source attribution
const EXCERPT_LEN: usize = 300;

/// Groups reranked candidates into relevance tiers and merges their text
/// into one attributed context block.
#[derive(Default)]
pub struct ContextConsolidator;

impl ContextConsolidator {
    pub fn new() -> Self {
        Self
    }

    /// Build the consolidated context from the top `max_sources`
    /// candidates.
    ///
    /// An empty candidate list fails with `NoRelevantContext` - a normal,
    /// expected outcome distinct from infrastructure failure. A
    /// `max_sources` of zero is treated identically: no usable context can
    /// be produced.
    pub fn consolidate(
        &self,
        ranked: &[Candidate],
        max_sources: usize,
    ) -> Result<ConsolidatedContext> {
        let selected: Vec<&Candidate> = ranked.iter().take(max_sources).collect();
        if selected.is_empty() {
            return Err(RetrievalError::NoRelevantContext);
        }

        // Candidates arrive sorted by enhanced score and tiers are
        // monotone in that score, so walking tier sections in order
        // preserves rank order overall.
        let mut parts = Vec::new();
        let mut sources = Vec::new();
        for (tier, header) in TIER_SECTIONS {
            let in_tier: Vec<&&Candidate> = selected
                .iter()
                .filter(|c| c.relevance_tier == *tier)
                .collect();
            if in_tier.is_empty() {
                continue;
            }

            parts.push((*header).to_string());
            for candidate in in_tier {
                let index = sources.len() + 1;
                parts.push(format!(
                    "[Source {}: {} - {}]\n{}",
                    index,
                    candidate.metadata.file_name,
                    candidate.relevance_tier.label(),
                    candidate.content
                ));
                sources.push(SourceRef {
                    file_name: candidate.metadata.file_name.clone(),
                    excerpt: excerpt(&candidate.content),
                    score: candidate.enhanced_score,
                    tier: candidate.relevance_tier,
                    category: candidate.metadata.category.clone(),
                });
            }
        }

        let average_score =
            sources.iter().map(|s| s.score).sum::<f32>() / sources.len() as f32;

        Ok(ConsolidatedContext {
            text: parts.join(CHUNK_DELIMITER),
            dominant_category: dominant_category(&selected),
            average_score,
            sources,
        })
    }
}

/// Most frequent category among selected chunks, or "mixed" when no single
/// category holds a strict majority. BTreeMap keeps the winner stable when
/// counts tie.
fn dominant_category(selected: &[&Candidate]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for candidate in selected {
        *counts.entry(candidate.metadata.category.as_str()).or_insert(0) += 1;
    }

    let (category, count) = counts
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(category, count)| (*category, *count))
        .unwrap_or(("mixed", 0));

    if count * 2 > selected.len() {
        category.to_string()
    } else {
        "mixed".to_string()
    }
}

fn excerpt(content: &str) -> String {
    if content.len() <= EXCERPT_LEN {
        return content.to_string();
    }
    let mut end = EXCERPT_LEN;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &content[..end])
}
