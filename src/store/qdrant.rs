//! Qdrant-backed vector store adapter.

use crate::store::{SearchFilter, VectorStore};
use crate::types::{ChunkMetadata, ScoredPoint, StorePoint};
use anyhow::{Context, Result};
use async_trait::async_trait;
use qdrant_client::{
    client::QdrantClient,
    qdrant::{
        point_id::PointIdOptions, value::Kind, vectors_config::Config,
        with_payload_selector::SelectorOptions, Condition, CreateCollection, Distance,
        FieldCondition, Filter, Match, PointId, PointStruct, PointsIdsList, PointsSelector,
        SearchPoints, Value as QdrantValue, VectorParams, VectorsConfig, WithPayloadSelector,
    },
};
use std::collections::HashMap;

/// Payload key holding the chunk text; every other key is chunk metadata
const CONTENT_KEY: &str = "content";

/// Vector store adapter backed by a Qdrant collection
pub struct QdrantVectorStore {
    client: QdrantClient,
    collection: String,
}

impl QdrantVectorStore {
    /// Connect to Qdrant and ensure the collection exists
    pub async fn connect(url: &str, collection: &str, vector_dim: u64) -> Result<Self> {
        let client = QdrantClient::from_url(url)
            .build()
            .context("Failed to create Qdrant client")?;

        let store = Self {
            client,
            collection: collection.to_string(),
        };
        store.init_collection(vector_dim).await?;

        Ok(store)
    }

    async fn init_collection(&self, vector_dim: u64) -> Result<()> {
        let collections_list = self.client.list_collections().await?;
        let exists = collections_list
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            self.client
                .create_collection(&CreateCollection {
                    collection_name: self.collection.clone(),
                    vectors_config: Some(VectorsConfig {
                        config: Some(Config::Params(VectorParams {
                            size: vector_dim,
                            distance: Distance::Cosine.into(),
                            ..Default::default()
                        })),
                    }),
                    ..Default::default()
                })
                .await
                .context(format!("Failed to create collection: {}", self.collection))?;
        }

        Ok(())
    }

    /// Number of points currently stored in the collection
    pub async fn point_count(&self) -> Result<u64> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .context("Failed to get collection info")?;

        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }

    fn build_filter(filter: &SearchFilter) -> Filter {
        Filter {
            must: vec![Condition {
                condition_one_of: Some(
                    qdrant_client::qdrant::condition::ConditionOneOf::Field(FieldCondition {
                        key: "category".to_string(),
                        r#match: Some(Match {
                            match_value: Some(
                                qdrant_client::qdrant::r#match::MatchValue::Keyword(
                                    filter.category.clone(),
                                ),
                            ),
                        }),
                        ..Default::default()
                    }),
                ),
            }],
            ..Default::default()
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, points: Vec<StorePoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let qdrant_points: Vec<PointStruct> = points
            .into_iter()
            .map(|point| {
                let mut payload = metadata_to_payload(&point.metadata);
                payload.insert(CONTENT_KEY.to_string(), QdrantValue::from(point.content));
                PointStruct::new(point.id, point.vector, payload)
            })
            .collect();

        self.client
            .upsert_points_blocking(&self.collection, None, qdrant_points, None)
            .await
            .context("Failed to upsert points")?;

        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<ScoredPoint>> {
        let search_result = self
            .client
            .search_points(&SearchPoints {
                collection_name: self.collection.clone(),
                vector: vector.to_vec(),
                limit: limit as u64,
                with_payload: Some(WithPayloadSelector {
                    selector_options: Some(SelectorOptions::Enable(true)),
                }),
                filter: filter.map(Self::build_filter),
                ..Default::default()
            })
            .await
            .context("Failed to search points")?;

        let results = search_result
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload;
                let content = payload_str(&payload, CONTENT_KEY);

                ScoredPoint {
                    id: point_id_to_string(&point.id),
                    score: point.score,
                    content,
                    metadata: payload_to_metadata(&payload),
                }
            })
            .collect();

        Ok(results)
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        self.client
            .delete_points(
                &self.collection,
                None,
                &PointsSelector {
                    points_selector_one_of: Some(
                        qdrant_client::qdrant::points_selector::PointsSelectorOneOf::Points(
                            PointsIdsList {
                                ids: ids.iter().map(|id| PointId::from(id.clone())).collect(),
                            },
                        ),
                    ),
                },
                None,
            )
            .await
            .context("Failed to delete points")?;

        Ok(())
    }
}

// Payload conversion helpers

fn metadata_to_payload(metadata: &ChunkMetadata) -> HashMap<String, QdrantValue> {
    let mut payload = HashMap::new();
    payload.insert(
        "file_name".to_string(),
        QdrantValue::from(metadata.file_name.clone()),
    );
    payload.insert(
        "category".to_string(),
        QdrantValue::from(metadata.category.clone()),
    );
    payload.insert(
        "document_type".to_string(),
        QdrantValue::from(metadata.document_type.clone()),
    );
    payload.insert(
        "section_type".to_string(),
        QdrantValue::from(metadata.section_type.clone()),
    );
    payload.insert(
        "technical_content".to_string(),
        QdrantValue::from(metadata.technical_content),
    );
    payload.insert(
        "chunk_length".to_string(),
        QdrantValue::from(metadata.chunk_length as i64),
    );
    payload.insert(
        "contains_units".to_string(),
        QdrantValue::from(metadata.contains_units),
    );
    payload
}

/// Typed payload accessors: a missing key or a mismatched kind falls back
/// to the field's default rather than failing the whole hit.
fn payload_to_metadata(payload: &HashMap<String, QdrantValue>) -> ChunkMetadata {
    ChunkMetadata {
        file_name: payload_str(payload, "file_name"),
        category: payload_str(payload, "category"),
        document_type: payload_str(payload, "document_type"),
        section_type: payload_str(payload, "section_type"),
        technical_content: payload_bool(payload, "technical_content"),
        chunk_length: payload_len(payload, "chunk_length"),
        contains_units: payload_bool(payload, "contains_units"),
    }
}

fn payload_kind<'a>(payload: &'a HashMap<String, QdrantValue>, key: &str) -> Option<&'a Kind> {
    payload.get(key).and_then(|value| value.kind.as_ref())
}

fn payload_str(payload: &HashMap<String, QdrantValue>, key: &str) -> String {
    match payload_kind(payload, key) {
        Some(Kind::StringValue(s)) => s.clone(),
        _ => String::new(),
    }
}

fn payload_bool(payload: &HashMap<String, QdrantValue>, key: &str) -> bool {
    matches!(payload_kind(payload, key), Some(Kind::BoolValue(true)))
}

fn payload_len(payload: &HashMap<String, QdrantValue>, key: &str) -> usize {
    match payload_kind(payload, key) {
        Some(Kind::IntegerValue(n)) if *n > 0 => *n as usize,
        _ => 0,
    }
}

fn point_id_to_string(point_id: &Option<PointId>) -> String {
    match point_id.as_ref().and_then(|id| id.point_id_options.as_ref()) {
        Some(PointIdOptions::Num(n)) => n.to_string(),
        Some(PointIdOptions::Uuid(uuid)) => uuid.clone(),
        None => String::new(),
    }
}
