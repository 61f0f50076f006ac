//! Shared data types for the retrieval pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Metadata attached to every indexed chunk. Assigned at ingestion and
/// immutable afterwards; re-ingestion replaces the chunk wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub file_name: String,
    /// Domain tag, e.g. "energy"
    pub category: String,
    /// e.g. "audit", "calculation", "report"
    pub document_type: String,
    /// e.g. "requirement_section", "calculation_section", "content_section"
    pub section_type: String,
    pub technical_content: bool,
    /// Content length in characters, recorded at ingestion
    pub chunk_length: usize,
    /// Whether the chunk carries values with physical units (kWh, m2, ...)
    #[serde(default)]
    pub contains_units: bool,
}

/// A chunk as handed to the vector store for indexing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorePoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// A single nearest-neighbor hit returned by the vector store,
/// in the store's own descending-similarity order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// One user question, constructed per request and discarded afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Text as submitted, preserved verbatim for display and logging
    pub raw_text: String,
    /// Trimmed, whitespace-collapsed, lowercased form used for matching
    pub normalized_text: String,
    /// Domain tag detected from keywords, drives optional filtering
    pub inferred_category: Option<String>,
    /// Salient terms extracted for scoring; BTreeSet keeps iteration
    /// order deterministic
    pub keywords: BTreeSet<String>,
    /// Related terms from the matched category rule, carried for
    /// diagnostics and logging
    pub expansion_terms: Vec<String>,
}

/// Coarse relevance bucket derived from the enhanced score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceTier {
    High,
    Medium,
    Low,
}

impl RelevanceTier {
    pub fn label(&self) -> &'static str {
        match self {
            RelevanceTier::High => "high",
            RelevanceTier::Medium => "medium",
            RelevanceTier::Low => "low",
        }
    }
}

/// A chunk paired with its relevance assessment for one specific query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub chunk_id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
    /// Similarity score as returned by the vector store
    pub raw_score: f32,
    /// Raw score plus metadata-driven adjustments; unbounded relative
    /// ranking value, deliberately not clamped to [0, 1]
    pub enhanced_score: f32,
    pub relevance_tier: RelevanceTier,
    /// Position in the store's original result list; secondary tie-break
    /// key during reranking
    pub store_rank: usize,
}

/// Attribution entry for one chunk included in the consolidated context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub file_name: String,
    pub excerpt: String,
    pub score: f32,
    pub tier: RelevanceTier,
    pub category: String,
}

/// Final payload handed to answer generation: a bounded text block with
/// per-chunk attribution plus aggregate statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedContext {
    pub text: String,
    /// Insertion order equals rank order; never two entries for the same
    /// chunk id, never more than the requested max_sources
    pub sources: Vec<SourceRef>,
    pub average_score: f32,
    /// Most frequent category among included chunks, or "mixed" when no
    /// single category holds a majority
    pub dominant_category: String,
}

/// Coarse confidence label derived from consolidated result statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}
