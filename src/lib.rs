//! ragcore - retrieval and reranking core for grounded document QA
//!
//! Turns a natural-language question into a ranked, filtered, deduplicated
//! set of context chunks suitable for answer generation:
//!
//! - Query normalization: cleanup, category inference, keyword extraction
//! - Embedding gateway: batching and retry over an external provider
//! - Vector search: nearest-neighbor queries with optional metadata filters
//! - Score enhancement: metadata-driven bonuses and penalties
//! - Reranking: deterministic ordering, tie-breaking, deduplication
//! - Consolidation: tiered, attributed context block with statistics
//! - Confidence assessment: coarse label over the consolidated result
//!
//! Embedding provider, vector store, and language model are external
//! collaborators reached through the `EmbeddingProvider` and `VectorStore`
//! traits; the core holds no mutable state across requests.

pub mod config;
pub mod context;
pub mod embedding;
pub mod errors;
pub mod pipeline;
pub mod query;
pub mod rerank;
pub mod search;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{CategoryRule, RetrievalConfig, RetryConfig, ScoringConfig};
pub use context::{ConfidenceAssessor, ContextConsolidator};
pub use embedding::{EmbeddingGateway, EmbeddingProvider, HttpEmbeddingProvider, ProviderError};
pub use errors::{RetrievalError, Result};
pub use pipeline::{RetrievalPipeline, RetrievalReport};
pub use query::QueryNormalizer;
pub use rerank::{ResultReranker, ScoreEnhancer};
pub use search::VectorSearchClient;
pub use store::{memory::InMemoryVectorStore, qdrant::QdrantVectorStore, SearchFilter, VectorStore};
pub use types::{
    Candidate, ChunkMetadata, ConfidenceLevel, ConsolidatedContext, Query, RelevanceTier,
    ScoredPoint, SourceRef, StorePoint,
};
