//! Immutable configuration for the retrieval core.
//!
//! Built once at process start and shared by reference into every component
//! constructor. The core never reads environment variables or files itself;
//! the embedding caller owns configuration sources.

use crate::errors::{RetrievalError, Result};
use serde::{Deserialize, Serialize};

/// Scoring constants applied by the score enhancer.
///
/// All bonuses are additive and order-independent in value; the application
/// order is still fixed (see the enhancer) so each step's contribution is
/// independently verifiable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// B1: bonus when chunk category equals the query's inferred category
    pub category_match_bonus: f32,
    /// B2: bonus when the document type is in `technical_document_types`
    pub document_type_bonus: f32,
    /// B3: bonus for chunks flagged as technical content
    pub technical_content_bonus: f32,
    /// P1: penalty for chunks shorter than `min_chunk_length`
    pub short_chunk_penalty: f32,
    /// B4: bonus for chunks longer than `long_chunk_length`
    pub long_chunk_bonus: f32,
    /// B5: bonus for unit-bearing chunks on technical-leaning queries
    pub units_bonus: f32,
    /// Chunks below this length take the short-chunk penalty
    pub min_chunk_length: usize,
    /// Chunks above this length take the long-chunk bonus
    pub long_chunk_length: usize,
    /// T_high: enhanced scores above this are tier "high"
    pub t_high: f32,
    /// T_medium: enhanced scores above this are tier "medium"
    pub t_medium: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            category_match_bonus: 0.30,
            document_type_bonus: 0.10,
            technical_content_bonus: 0.15,
            short_chunk_penalty: 0.05,
            long_chunk_bonus: 0.05,
            units_bonus: 0.10,
            min_chunk_length: 200,
            long_chunk_length: 800,
            t_high: 0.7,
            t_medium: 0.5,
        }
    }
}

/// Bounded retry policy for the embedding gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Add +/-25% random variation to each delay. Disabled in tests for
    /// deterministic timing.
    pub enable_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 8000,
            enable_jitter: true,
        }
    }
}

/// One category-inference rule: the first rule whose keyword set intersects
/// the query's tokens wins. Declaration order is the documented precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
    /// Related terms carried onto the query for diagnostics
    pub expansion_terms: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: &str, keywords: &[&str], expansion_terms: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            expansion_terms: expansion_terms.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Top-level retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub scoring: ScoringConfig,
    pub retry: RetryConfig,
    /// Default number of nearest neighbors requested per search
    pub default_k: usize,
    /// Default cap on sources included in the consolidated context
    pub default_max_sources: usize,
    /// The store is asked for this multiple of the requested limit so the
    /// reranker has headroom to filter and dedup
    pub overfetch_factor: usize,
    /// When true and the query carries a category, search filtered and
    /// unfiltered and merge before reranking. Single search is the
    /// baseline; this is an optional extension.
    pub hybrid_search: bool,
    /// Ordered category-inference rules, first match wins
    pub category_rules: Vec<CategoryRule>,
    /// Document types considered technical for the B2 bonus
    pub technical_document_types: Vec<String>,
    /// Query categories that benefit from the unit-bearing bonus (B5)
    pub technical_categories: Vec<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            retry: RetryConfig::default(),
            default_k: 6,
            default_max_sources: 4,
            overfetch_factor: 2,
            hybrid_search: false,
            category_rules: default_category_rules(),
            technical_document_types: vec![
                "audit".to_string(),
                "calculation".to_string(),
                "assessment".to_string(),
            ],
            technical_categories: vec!["energy".to_string(), "technical".to_string()],
        }
    }
}

/// Fixed precedence list for category inference. Earlier rules win ties, so
/// a query mentioning both energy and water classifies as "energy".
fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "energy",
            &["energy", "thermal", "hvac", "heating", "cooling", "kwh", "consumption", "efficiency"],
            &["thermal", "heating", "cooling", "efficiency", "consumption", "performance"],
        ),
        CategoryRule::new(
            "water",
            &["water", "plumbing", "drainage", "sanitary", "hydraulic"],
            &["plumbing", "drainage", "sanitary", "hydraulic"],
        ),
        CategoryRule::new(
            "transport",
            &["transport", "access", "mobility", "traffic", "parking"],
            &["access", "mobility", "circulation", "traffic"],
        ),
        CategoryRule::new(
            "regulatory",
            &["requirement", "standard", "norm", "regulation", "compliance"],
            &["standard", "regulation", "compliance", "norm", "criterion"],
        ),
        CategoryRule::new(
            "technical",
            &["calculation", "analysis", "assess", "evaluate", "audit"],
            &["analysis", "assessment", "evaluation", "computation", "estimate"],
        ),
    ]
}

impl RetrievalConfig {
    /// Validate the configuration. Called once at construction; a failure
    /// here is fatal at process initialization and never mid-request.
    pub fn validate(&self) -> Result<()> {
        let s = &self.scoring;
        let constants = [
            ("category_match_bonus", s.category_match_bonus),
            ("document_type_bonus", s.document_type_bonus),
            ("technical_content_bonus", s.technical_content_bonus),
            ("short_chunk_penalty", s.short_chunk_penalty),
            ("long_chunk_bonus", s.long_chunk_bonus),
            ("units_bonus", s.units_bonus),
            ("t_high", s.t_high),
            ("t_medium", s.t_medium),
        ];
        for (name, value) in constants {
            if !value.is_finite() {
                return Err(RetrievalError::Config(format!(
                    "scoring constant {} is not finite",
                    name
                )));
            }
        }

        if s.t_medium >= s.t_high {
            return Err(RetrievalError::Config(format!(
                "t_medium ({}) must be below t_high ({})",
                s.t_medium, s.t_high
            )));
        }

        if self.default_k == 0 {
            return Err(RetrievalError::Config("default_k must be at least 1".to_string()));
        }

        if self.overfetch_factor == 0 {
            return Err(RetrievalError::Config(
                "overfetch_factor must be at least 1".to_string(),
            ));
        }

        for rule in &self.category_rules {
            if rule.category.is_empty() {
                return Err(RetrievalError::Config(
                    "category rule with empty category name".to_string(),
                ));
            }
            if rule.keywords.is_empty() {
                return Err(RetrievalError::Config(format!(
                    "category rule '{}' has no keywords",
                    rule.category
                )));
            }
        }

        Ok(())
    }

    /// Validate and return the configuration, for use at construction sites
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RetrievalConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_scoring_constants() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.category_match_bonus, 0.30);
        assert_eq!(scoring.document_type_bonus, 0.10);
        assert_eq!(scoring.technical_content_bonus, 0.15);
        assert_eq!(scoring.t_high, 0.7);
        assert_eq!(scoring.t_medium, 0.5);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut config = RetrievalConfig::default();
        config.scoring.t_medium = 0.9;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, RetrievalError::Config(_)));
    }

    #[test]
    fn test_non_finite_constant_rejected() {
        let mut config = RetrievalConfig::default();
        config.scoring.category_match_bonus = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_k_rejected() {
        let mut config = RetrievalConfig::default();
        config.default_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_rule_keywords_rejected() {
        let mut config = RetrievalConfig::default();
        config.category_rules.push(CategoryRule::new("empty", &[], &[]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rule_precedence_order() {
        // Energy is declared first and must win ties against water.
        let rules = default_category_rules();
        assert_eq!(rules[0].category, "energy");
        assert_eq!(rules[1].category, "water");
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = RetrievalConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: RetrievalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.default_k, config.default_k);
        assert_eq!(back.category_rules.len(), config.category_rules.len());
    }
}
