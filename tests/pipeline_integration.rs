//! End-to-end tests for the retrieval pipeline.
//!
//! Runs the full flow against the deterministic in-memory store and a
//! keyword-counting fake embedder, so results are reproducible without any
//! external service.

use async_trait::async_trait;
use ragcore::{
    Candidate, ChunkMetadata, ConfidenceLevel, EmbeddingProvider, InMemoryVectorStore,
    ProviderError, RelevanceTier, RetrievalConfig, RetrievalError, RetrievalPipeline, RetryConfig,
    ScoredPoint, SearchFilter, StorePoint, VectorStore,
};
use std::sync::Arc;

/// Deterministic fake embedder: counts domain keywords into a fixed-length
/// vector. Identical text always produces the identical vector.
struct KeywordEmbedder;

fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let count = |terms: &[&str]| -> f32 {
        terms
            .iter()
            .map(|t| lower.matches(t).count() as f32)
            .sum()
    };
    vec![
        count(&["energy", "thermal", "kwh", "consumption"]),
        count(&["water", "plumbing", "drainage"]),
        count(&["transport", "access", "mobility"]),
        0.1, // shared component so no vector is ever zero
    ]
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(keyword_vector(text))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }
}

fn chunk(id: &str, content: &str, file_name: &str, category: &str) -> StorePoint {
    StorePoint {
        id: id.to_string(),
        vector: keyword_vector(content),
        content: content.to_string(),
        metadata: ChunkMetadata {
            file_name: file_name.to_string(),
            category: category.to_string(),
            document_type: "audit".to_string(),
            section_type: "content_section".to_string(),
            technical_content: true,
            chunk_length: content.len().max(300),
            contains_units: false,
        },
    }
}

async fn seeded_store() -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    store
        .upsert(vec![
            chunk(
                "energy-1",
                "Energy consumption must stay below 120 kWh per square meter per year.",
                "HEA_01_requirements.pdf",
                "energy",
            ),
            chunk(
                "energy-2",
                "Annual energy audits track energy consumption against the thermal baseline.",
                "ENE_02_audit.pdf",
                "energy",
            ),
            chunk(
                "water-1",
                "Water system calculations show consumption of 150 liters per day per person.",
                "WAT_02_calculations.xlsx",
                "water",
            ),
            chunk(
                "transport-1",
                "Transport accessibility assessment covers public access and mobility standards.",
                "TRA_01_assessment.docx",
                "transport",
            ),
        ])
        .await
        .unwrap();
    store
}

fn test_config() -> RetrievalConfig {
    let mut config = RetrievalConfig::default();
    config.retry = RetryConfig {
        max_retries: 2,
        base_delay_ms: 1,
        max_delay_ms: 4,
        enable_jitter: false,
    };
    config
}

async fn pipeline() -> RetrievalPipeline {
    RetrievalPipeline::with_config(Arc::new(KeywordEmbedder), seeded_store().await, test_config())
        .unwrap()
}

#[tokio::test]
async fn test_retrieve_finds_energy_chunks_first() {
    let p = pipeline().await;
    let context = p
        .retrieve("What is the energy consumption limit?", 4, None)
        .await
        .unwrap();

    assert!(!context.sources.is_empty());
    assert_eq!(context.sources[0].file_name, "HEA_01_requirements.pdf");
    assert!(context.text.contains("120 kWh"));
    assert!(context.text.contains("[Source 1: HEA_01_requirements.pdf"));
}

#[tokio::test]
async fn test_retrieve_is_deterministic() {
    let p = pipeline().await;
    let first = p
        .retrieve("What is the energy consumption limit?", 4, None)
        .await
        .unwrap();

    for _ in 0..5 {
        let again = p
            .retrieve("What is the energy consumption limit?", 4, None)
            .await
            .unwrap();
        let names: Vec<&str> = again.sources.iter().map(|s| s.file_name.as_str()).collect();
        let expected: Vec<&str> = first.sources.iter().map(|s| s.file_name.as_str()).collect();
        assert_eq!(names, expected);
        assert_eq!(again.text, first.text);
    }
}

#[tokio::test]
async fn test_no_duplicate_sources_and_monotonic_scores() {
    let p = pipeline().await;
    let context = p.retrieve("energy and water consumption", 4, None).await.unwrap();

    let mut names: Vec<&str> = context.sources.iter().map(|s| s.file_name.as_str()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), context.sources.len());

    for pair in context.sources.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_max_sources_bound_respected() {
    let p = pipeline().await;
    for max_sources in 1..=6 {
        let context = p.retrieve("energy consumption", max_sources, None).await.unwrap();
        assert!(context.sources.len() <= max_sources);
    }
}

#[tokio::test]
async fn test_max_sources_zero_is_no_relevant_context() {
    let p = pipeline().await;
    let err = p.retrieve("energy consumption", 0, None).await.unwrap_err();
    assert!(matches!(err, RetrievalError::NoRelevantContext));
}

#[tokio::test]
async fn test_category_filter_restricts_sources() {
    let p = pipeline().await;
    let context = p
        .retrieve("consumption requirements", 4, Some("water"))
        .await
        .unwrap();

    for source in &context.sources {
        assert_eq!(source.category, "water");
    }
    assert_eq!(context.dominant_category, "water");
}

#[tokio::test]
async fn test_empty_store_yields_no_relevant_context_not_search_error() {
    let p = RetrievalPipeline::with_config(
        Arc::new(KeywordEmbedder),
        Arc::new(InMemoryVectorStore::new()),
        test_config(),
    )
    .unwrap();

    let err = p.retrieve("energy consumption", 4, None).await.unwrap_err();
    assert!(matches!(err, RetrievalError::NoRelevantContext));
    assert!(!err.is_infrastructure());

    // The raw search path reports the same situation as an empty list.
    let raw = p.search_raw("energy consumption", 4).await.unwrap();
    assert!(raw.is_empty());
}

#[tokio::test]
async fn test_search_raw_returns_ranked_candidates() {
    let p = pipeline().await;
    let candidates = p.search_raw("energy consumption", 2).await.unwrap();

    assert!(candidates.len() <= 2);
    assert!(!candidates.is_empty());
    for pair in candidates.windows(2) {
        assert!(pair[0].enhanced_score >= pair[1].enhanced_score);
    }
}

#[tokio::test]
async fn test_large_limit_not_capped_by_default_fetch_size() {
    // A store holding more relevant chunks than the default k: asking for
    // all of them must return all of them.
    let store = Arc::new(InMemoryVectorStore::new());
    let points: Vec<StorePoint> = (0..20)
        .map(|i| {
            chunk(
                &format!("energy-{:02}", i),
                &format!("Energy reading number {} from the annual log.", i),
                &format!("ENE_{:02}_log.pdf", i),
                "energy",
            )
        })
        .collect();
    store.upsert(points).await.unwrap();

    let p = RetrievalPipeline::with_config(Arc::new(KeywordEmbedder), store, test_config())
        .unwrap();

    let candidates = p.search_raw("energy question", 20).await.unwrap();
    assert_eq!(candidates.len(), 20);

    let context = p.retrieve("energy question", 15, None).await.unwrap();
    assert_eq!(context.sources.len(), 15);
}

#[tokio::test]
async fn test_execute_reports_confidence_and_counters() {
    let p = pipeline().await;
    let report = p
        .execute("What is the energy consumption limit?", 4, None)
        .await
        .unwrap();

    assert_eq!(report.query.inferred_category.as_deref(), Some("energy"));
    assert!(report.candidates_retrieved >= report.candidates_ranked);
    assert!(report.candidates_ranked >= report.context.sources.len());
    assert!(matches!(
        report.confidence,
        ConfidenceLevel::High | ConfidenceLevel::Medium
    ));
}

#[tokio::test]
async fn test_hybrid_mode_merges_without_duplicates() {
    let mut config = test_config();
    config.hybrid_search = true;
    let p = RetrievalPipeline::with_config(Arc::new(KeywordEmbedder), seeded_store().await, config)
        .unwrap();

    let context = p
        .retrieve("What is the energy consumption limit?", 6, None)
        .await
        .unwrap();

    let mut names: Vec<&str> = context.sources.iter().map(|s| s.file_name.as_str()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), context.sources.len());
    assert_eq!(context.sources[0].file_name, "HEA_01_requirements.pdf");
}

// Fixed-score store for scenarios that pin exact raw scores.
struct FixedStore {
    hits: Vec<ScoredPoint>,
}

#[async_trait]
impl VectorStore for FixedStore {
    async fn upsert(&self, _points: Vec<StorePoint>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn search(
        &self,
        _vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> anyhow::Result<Vec<ScoredPoint>> {
        let mut hits: Vec<ScoredPoint> = self
            .hits
            .iter()
            .filter(|hit| match filter {
                Some(f) => hit.metadata.category == f.category,
                None => true,
            })
            .cloned()
            .collect();
        hits.truncate(limit);
        Ok(hits)
    }

    async fn delete(&self, _ids: &[String]) -> anyhow::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_energy_limit_scenario_exact_scores() {
    // One stored chunk scoring 0.80 for an energy question: the category,
    // document-type, and technical-content bonuses all apply, no penalty,
    // and a single source assesses as medium confidence (high needs two).
    let store = Arc::new(FixedStore {
        hits: vec![ScoredPoint {
            id: "c1".to_string(),
            score: 0.80,
            content: "Energy consumption must stay below 120 kWh/m2/year.".to_string(),
            metadata: ChunkMetadata {
                file_name: "audit.pdf".to_string(),
                category: "energy".to_string(),
                document_type: "audit".to_string(),
                section_type: "requirement_section".to_string(),
                technical_content: true,
                chunk_length: 900,
                contains_units: false,
            },
        }],
    });

    let mut config = test_config();
    config.scoring.long_chunk_bonus = 0.0;
    config.scoring.units_bonus = 0.0;

    let p = RetrievalPipeline::with_config(Arc::new(KeywordEmbedder), store, config).unwrap();
    let report = p
        .execute("What is the energy consumption limit?", 4, None)
        .await
        .unwrap();

    assert_eq!(report.query.inferred_category.as_deref(), Some("energy"));
    assert_eq!(report.context.sources.len(), 1);
    // 0.80 + category 0.30 + document type 0.10 + technical content 0.15
    assert!((report.context.sources[0].score - 1.35).abs() < 1e-6);
    assert_eq!(report.context.sources[0].tier, RelevanceTier::High);
    assert_eq!(report.context.dominant_category, "energy");
    assert_eq!(report.confidence, ConfidenceLevel::Medium);
}

#[tokio::test]
async fn test_identical_content_dedup_keeps_higher_score() {
    let content = "Energy consumption must stay below 120 kWh/m2/year.";
    let metadata = ChunkMetadata {
        file_name: "audit.pdf".to_string(),
        category: "energy".to_string(),
        document_type: "report".to_string(),
        section_type: "content_section".to_string(),
        technical_content: false,
        chunk_length: 500,
        contains_units: false,
    };

    let store = Arc::new(FixedStore {
        hits: vec![
            ScoredPoint {
                id: "c1".to_string(),
                score: 0.75,
                content: content.to_string(),
                metadata: metadata.clone(),
            },
            ScoredPoint {
                id: "c2".to_string(),
                score: 0.60,
                // Same passage, different whitespace.
                content: "Energy consumption  must stay below\n120 kWh/m2/year.".to_string(),
                metadata,
            },
        ],
    });

    let p = RetrievalPipeline::with_config(Arc::new(KeywordEmbedder), store, test_config()).unwrap();
    let candidates = p.search_raw("energy consumption", 10).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].chunk_id, "c1");
}

#[tokio::test]
async fn test_store_failure_propagates_as_retrieval_unavailable() {
    struct DownStore;

    #[async_trait]
    impl VectorStore for DownStore {
        async fn upsert(&self, _points: Vec<StorePoint>) -> anyhow::Result<()> {
            Ok(())
        }

        async fn search(
            &self,
            _vector: &[f32],
            _limit: usize,
            _filter: Option<&SearchFilter>,
        ) -> anyhow::Result<Vec<ScoredPoint>> {
            anyhow::bail!("connection refused")
        }

        async fn delete(&self, _ids: &[String]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    let p = RetrievalPipeline::with_config(Arc::new(KeywordEmbedder), Arc::new(DownStore), test_config())
        .unwrap();
    let err = p.retrieve("energy consumption", 4, None).await.unwrap_err();
    assert!(matches!(err, RetrievalError::RetrievalUnavailable(_)));
    assert!(err.is_infrastructure());
}

#[tokio::test]
async fn test_embedding_outage_propagates_after_retries() {
    struct DownProvider;

    #[async_trait]
    impl EmbeddingProvider for DownProvider {
        async fn embed_one(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
            Err(ProviderError::Transient("rate limited".to_string()))
        }

        async fn embed_many(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
            Err(ProviderError::Transient("rate limited".to_string()))
        }
    }

    let p = RetrievalPipeline::with_config(Arc::new(DownProvider), seeded_store().await, test_config())
        .unwrap();
    let err = p.retrieve("energy consumption", 4, None).await.unwrap_err();
    assert!(matches!(err, RetrievalError::EmbeddingUnavailable(_)));
}

#[tokio::test]
async fn test_candidate_fields_populated() {
    let p = pipeline().await;
    let candidates: Vec<Candidate> = p.search_raw("energy consumption", 3).await.unwrap();

    for candidate in candidates {
        assert!(!candidate.chunk_id.is_empty());
        assert!(!candidate.content.is_empty());
        assert!(!candidate.metadata.file_name.is_empty());
        assert!(candidate.enhanced_score >= candidate.raw_score);
    }
}
