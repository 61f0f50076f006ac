//! Vector store boundary: one trait, two implementations.
//!
//! The real adapter talks to Qdrant; the in-memory implementation provides
//! deterministic cosine-similarity search for tests. Callers pick one by
//! dependency injection at construction time, never by a runtime flag.

pub mod memory;
pub mod qdrant;

use crate::types::{ScoredPoint, StorePoint};
use async_trait::async_trait;

/// Equality predicate on chunk metadata, applied store-side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// Restrict results to chunks with this exact category
    pub category: String,
}

impl SearchFilter {
    pub fn category(category: &str) -> Self {
        Self {
            category: category.to_string(),
        }
    }
}

/// Persists `(id, vector, payload)` points and answers nearest-neighbor
/// queries, optionally restricted by a metadata predicate.
///
/// Results come back in the store's own descending-similarity order, at
/// most `limit` of them; fewer matches is not an error.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, points: Vec<StorePoint>) -> anyhow::Result<()>;

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> anyhow::Result<Vec<ScoredPoint>>;

    async fn delete(&self, ids: &[String]) -> anyhow::Result<()>;
}
