//! End-to-end retrieval pipeline.
//!
//! Orchestrates the request-scoped flow: normalize -> embed -> search ->
//! enhance -> rerank -> consolidate -> assess. The pipeline holds no
//! mutable state across requests; every query constructs its own Query,
//! candidate set, and consolidated context.

use crate::config::RetrievalConfig;
use crate::context::{ConfidenceAssessor, ContextConsolidator};
use crate::embedding::{EmbeddingGateway, EmbeddingProvider};
use crate::errors::Result;
use crate::query::QueryNormalizer;
use crate::rerank::{ResultReranker, ScoreEnhancer};
use crate::search::VectorSearchClient;
use crate::store::{SearchFilter, VectorStore};
use crate::types::{Candidate, ConfidenceLevel, ConsolidatedContext, Query};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Rich pipeline result: the consolidated context plus confidence and
/// per-stage counters for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalReport {
    pub query: Query,
    pub context: ConsolidatedContext,
    pub confidence: ConfidenceLevel,
    /// Candidates returned by the store before rerank and dedup
    pub candidates_retrieved: usize,
    /// Candidates surviving rerank and dedup
    pub candidates_ranked: usize,
}

/// The retrieval core's single construction point. Collaborators are
/// injected as trait objects; configuration is validated once here and
/// immutable afterwards.
pub struct RetrievalPipeline {
    config: Arc<RetrievalConfig>,
    normalizer: QueryNormalizer,
    gateway: EmbeddingGateway,
    search_client: VectorSearchClient,
    enhancer: ScoreEnhancer,
    reranker: ResultReranker,
    consolidator: ContextConsolidator,
    assessor: ConfidenceAssessor,
}

impl RetrievalPipeline {
    /// Create a pipeline with default configuration
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        Self::with_config(provider, store, RetrievalConfig::default())
    }

    /// Create a pipeline with custom configuration. Fails with a
    /// configuration error before any request runs.
    pub fn with_config(
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: RetrievalConfig,
    ) -> Result<Self> {
        let config = Arc::new(config.validated()?);

        Ok(Self {
            normalizer: QueryNormalizer::new(config.clone()),
            gateway: EmbeddingGateway::new(provider, config.retry.clone()),
            search_client: VectorSearchClient::new(store),
            enhancer: ScoreEnhancer::new(config.clone()),
            reranker: ResultReranker::new(),
            consolidator: ContextConsolidator::new(),
            assessor: ConfidenceAssessor::new(config.clone()),
            config,
        })
    }

    /// Primary entry point: turn a question into a consolidated, attributed
    /// context block with at most `max_sources` sources.
    pub async fn retrieve(
        &self,
        query_text: &str,
        max_sources: usize,
        category_filter: Option<&str>,
    ) -> Result<ConsolidatedContext> {
        let (_, ranked, _) = self
            .ranked_candidates(query_text, max_sources, category_filter)
            .await?;
        self.consolidator.consolidate(&ranked, max_sources)
    }

    /// Debug/inspection entry point: ranked candidates without
    /// consolidation, capped at `limit`.
    pub async fn search_raw(&self, query_text: &str, limit: usize) -> Result<Vec<Candidate>> {
        let (_, mut ranked, _) = self.ranked_candidates(query_text, limit, None).await?;
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Full pipeline run returning the context together with its
    /// confidence label and stage counters.
    pub async fn execute(
        &self,
        query_text: &str,
        max_sources: usize,
        category_filter: Option<&str>,
    ) -> Result<RetrievalReport> {
        let (query, ranked, candidates_retrieved) = self
            .ranked_candidates(query_text, max_sources, category_filter)
            .await?;
        let candidates_ranked = ranked.len();

        let context = self.consolidator.consolidate(&ranked, max_sources)?;
        let confidence = self.assessor.assess(&context);

        info!(
            sources = context.sources.len(),
            average_score = context.average_score,
            dominant_category = %context.dominant_category,
            ?confidence,
            "retrieval completed"
        );

        Ok(RetrievalReport {
            query,
            context,
            confidence,
            candidates_retrieved,
            candidates_ranked,
        })
    }

    /// Confidence label for an already-consolidated context
    pub fn assess(&self, context: &ConsolidatedContext) -> ConfidenceLevel {
        self.assessor.assess(context)
    }

    /// Shared front half of every entry point: normalize, embed, search,
    /// enhance, rerank.
    async fn ranked_candidates(
        &self,
        query_text: &str,
        requested: usize,
        category_filter: Option<&str>,
    ) -> Result<(Query, Vec<Candidate>, usize)> {
        let query = self.normalizer.normalize(query_text)?;
        debug!(
            category = ?query.inferred_category,
            keywords = query.keywords.len(),
            "query normalized"
        );

        let vector = self.gateway.embed(&query.normalized_text).await?;

        // Over-fetch relative to the larger of the caller's ask and the
        // default k, so rerank and dedup have headroom to drop candidates
        // without starving the consolidator.
        let fetch_k = requested.max(self.config.default_k) * self.config.overfetch_factor;
        let candidates = self.fetch_candidates(&query, &vector, fetch_k, category_filter).await?;
        let retrieved = candidates.len();
        debug!(candidates = retrieved, "candidates fetched");

        let enhanced: Vec<Candidate> = candidates
            .into_iter()
            .map(|c| self.enhancer.enhance(c, &query))
            .collect();

        let ranked = self.reranker.rerank(enhanced);
        Ok((query, ranked, retrieved))
    }

    /// Single-search baseline, or the optional hybrid extension: when
    /// hybrid mode is on and a category is known (explicit filter or
    /// inferred from the query), search filtered and unfiltered and merge;
    /// the reranker's dedup reconciles overlaps.
    async fn fetch_candidates(
        &self,
        query: &Query,
        vector: &[f32],
        fetch_k: usize,
        category_filter: Option<&str>,
    ) -> Result<Vec<Candidate>> {
        let explicit = category_filter.map(SearchFilter::category);

        if self.config.hybrid_search {
            let category = category_filter
                .map(|c| c.to_string())
                .or_else(|| query.inferred_category.clone());

            if let Some(category) = category {
                let filter = SearchFilter::category(&category);
                let filtered = self.search_client.search(vector, fetch_k, Some(&filter)).await?;
                let mut unfiltered = self.search_client.search(vector, fetch_k, None).await?;

                // Keep store ranks globally consistent across the merge so
                // the tie-break chain stays deterministic.
                let offset = filtered.len();
                for candidate in &mut unfiltered {
                    candidate.store_rank += offset;
                }

                let mut merged = filtered;
                merged.extend(unfiltered);
                return Ok(merged);
            }
        }

        self.search_client.search(vector, fetch_k, explicit.as_ref()).await
    }
}
