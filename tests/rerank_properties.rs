//! Property-based tests for the synchronous ranking components.

use quickcheck_macros::quickcheck;
use ragcore::{Candidate, ChunkMetadata, ContextConsolidator, RelevanceTier, ResultReranker};

fn candidate(index: usize, score: f32) -> Candidate {
    Candidate {
        chunk_id: format!("chunk-{:04}", index),
        content: format!("content of chunk {}", index),
        metadata: ChunkMetadata {
            file_name: format!("doc-{:04}.pdf", index),
            category: "energy".to_string(),
            ..Default::default()
        },
        raw_score: score,
        enhanced_score: score,
        relevance_tier: RelevanceTier::Medium,
        store_rank: index,
    }
}

fn candidates_from(scores: &[f32]) -> Vec<Candidate> {
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| candidate(i, if s.is_finite() { *s } else { 0.0 }))
        .collect()
}

#[quickcheck]
fn prop_rerank_orders_scores_descending(scores: Vec<f32>) -> bool {
    let ranked = ResultReranker::new().rerank(candidates_from(&scores));
    ranked
        .windows(2)
        .all(|pair| pair[0].enhanced_score >= pair[1].enhanced_score)
}

#[quickcheck]
fn prop_rerank_emits_unique_ids(scores: Vec<f32>) -> bool {
    let ranked = ResultReranker::new().rerank(candidates_from(&scores));
    let mut ids: Vec<&str> = ranked.iter().map(|c| c.chunk_id.as_str()).collect();
    let before = ids.len();
    ids.sort();
    ids.dedup();
    ids.len() == before
}

#[quickcheck]
fn prop_rerank_is_idempotent(scores: Vec<f32>) -> bool {
    let reranker = ResultReranker::new();
    let once = reranker.rerank(candidates_from(&scores));
    let twice = reranker.rerank(once.clone());
    let ids_once: Vec<&str> = once.iter().map(|c| c.chunk_id.as_str()).collect();
    let ids_twice: Vec<&str> = twice.iter().map(|c| c.chunk_id.as_str()).collect();
    ids_once == ids_twice
}

#[quickcheck]
fn prop_consolidate_respects_max_sources(scores: Vec<f32>, max_sources: usize) -> bool {
    let max_sources = max_sources % 32;
    let ranked = ResultReranker::new().rerank(candidates_from(&scores));
    match ContextConsolidator::new().consolidate(&ranked, max_sources) {
        Ok(context) => !context.sources.is_empty() && context.sources.len() <= max_sources,
        // Empty input or a zero cap cannot produce usable context.
        Err(_) => ranked.is_empty() || max_sources == 0,
    }
}

#[quickcheck]
fn prop_consolidate_attributes_every_source(scores: Vec<f32>) -> bool {
    let ranked = ResultReranker::new().rerank(candidates_from(&scores));
    match ContextConsolidator::new().consolidate(&ranked, ranked.len()) {
        Ok(context) => context
            .sources
            .iter()
            .all(|source| context.text.contains(source.file_name.as_str())),
        Err(_) => ranked.is_empty(),
    }
}
