//! Deterministic in-memory vector store for tests and local development.

use crate::store::{SearchFilter, VectorStore};
use crate::types::{ScoredPoint, StorePoint};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory store with exact cosine-similarity search.
///
/// Points live in a BTreeMap keyed by id, so iteration order (and therefore
/// tie-break order between equal scores) is deterministic across runs.
#[derive(Default)]
pub struct InMemoryVectorStore {
    points: RwLock<BTreeMap<String, StorePoint>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, points: Vec<StorePoint>) -> Result<()> {
        let mut store = self.points.write().expect("store lock poisoned");
        for point in points {
            store.insert(point.id.clone(), point);
        }
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<ScoredPoint>> {
        let store = self.points.read().expect("store lock poisoned");

        let mut scored: Vec<ScoredPoint> = store
            .values()
            .filter(|point| match filter {
                Some(f) => point.metadata.category == f.category,
                None => true,
            })
            .map(|point| ScoredPoint {
                id: point.id.clone(),
                score: cosine_similarity(vector, &point.vector),
                content: point.content.clone(),
                metadata: point.metadata.clone(),
            })
            .collect();

        // Descending by score; id order (already sorted by the BTreeMap)
        // breaks exact ties deterministically.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(limit);

        Ok(scored)
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        let mut store = self.points.write().expect("store lock poisoned");
        for id in ids {
            store.remove(id);
        }
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
