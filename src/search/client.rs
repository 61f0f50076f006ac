//! Search client: issues nearest-neighbor queries and shapes raw store
//! hits into candidates.

use crate::errors::{RetrievalError, Result};
use crate::store::{SearchFilter, VectorStore};
use crate::types::Candidate;
use std::sync::Arc;
use tracing::debug;

/// Thin client over the injected [`VectorStore`] handle.
///
/// Store connectivity failures surface as `RetrievalUnavailable` and must
/// fail the whole request; a degraded answer built from an empty context
/// would look grounded without being grounded.
pub struct VectorSearchClient {
    store: Arc<dyn VectorStore>,
}

impl VectorSearchClient {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Search for the k nearest chunks, optionally restricted by a
    /// metadata filter. Returns candidates carrying the raw store score
    /// and the store's own rank order; fewer than k hits is not an error.
    pub async fn search(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<Candidate>> {
        let hits = self
            .store
            .search(vector, k, filter)
            .await
            .map_err(|e| RetrievalError::RetrievalUnavailable(format!("{:#}", e)))?;

        debug!(hits = hits.len(), k, filtered = filter.is_some(), "vector search completed");

        let candidates = hits
            .into_iter()
            // Filtering is the store's job; this re-check is only a
            // correctness backstop for stores that ignore the predicate.
            .filter(|hit| match filter {
                Some(f) => hit.metadata.category == f.category,
                None => true,
            })
            .enumerate()
            .map(|(store_rank, hit)| Candidate {
                chunk_id: hit.id,
                content: hit.content,
                metadata: hit.metadata,
                raw_score: hit.score,
                enhanced_score: hit.score,
                relevance_tier: crate::types::RelevanceTier::Low,
                store_rank,
            })
            .collect();

        Ok(candidates)
    }
}
