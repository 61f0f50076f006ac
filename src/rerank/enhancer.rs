//! Deterministic additive score enhancement.
//!
//! Each candidate's raw similarity is adjusted by metadata-derived bonuses
//! and penalties in a fixed order, so every step's contribution is
//! independently verifiable. The bonuses commute in value; the order is an
//! implementation contract, not a data dependency.

use crate::config::RetrievalConfig;
use crate::types::{Candidate, Query, RelevanceTier};
use std::sync::Arc;

/// Recomputes a blended relevance score per candidate and assigns its
/// relevance tier from the configured thresholds.
pub struct ScoreEnhancer {
    config: Arc<RetrievalConfig>,
}

impl ScoreEnhancer {
    pub fn new(config: Arc<RetrievalConfig>) -> Self {
        Self { config }
    }

    /// Apply the scoring model, in order:
    /// 1. start from the raw store score
    /// 2. bonus when the chunk's category matches the query's inferred one
    /// 3. bonus when the document type counts as technical
    /// 4. bonus for chunks flagged as technical content
    /// 5. penalty for chunks below the minimum length
    /// 6. bonus for chunks above the long-chunk length
    /// 7. bonus for unit-bearing chunks answering a technical query
    ///
    /// The result is an unbounded relative ranking score; only the tier
    /// thresholds interpret its magnitude.
    pub fn enhance(&self, mut candidate: Candidate, query: &Query) -> Candidate {
        let s = &self.config.scoring;
        let mut score = candidate.raw_score;

        if let Some(category) = &query.inferred_category {
            if &candidate.metadata.category == category {
                score += s.category_match_bonus;
            }
        }

        if self
            .config
            .technical_document_types
            .contains(&candidate.metadata.document_type)
        {
            score += s.document_type_bonus;
        }

        if candidate.metadata.technical_content {
            score += s.technical_content_bonus;
        }

        if candidate.metadata.chunk_length < s.min_chunk_length {
            score -= s.short_chunk_penalty;
        }

        if candidate.metadata.chunk_length > s.long_chunk_length {
            score += s.long_chunk_bonus;
        }

        if candidate.metadata.contains_units && self.query_is_technical(query) {
            score += s.units_bonus;
        }

        candidate.enhanced_score = score;
        candidate.relevance_tier = self.tier_for(score);
        candidate
    }

    fn query_is_technical(&self, query: &Query) -> bool {
        match &query.inferred_category {
            Some(category) => self.config.technical_categories.contains(category),
            None => false,
        }
    }

    /// Tier assignment: strictly above `t_high` is high, strictly above
    /// `t_medium` is medium, everything else low.
    pub fn tier_for(&self, enhanced_score: f32) -> RelevanceTier {
        let s = &self.config.scoring;
        if enhanced_score > s.t_high {
            RelevanceTier::High
        } else if enhanced_score > s.t_medium {
            RelevanceTier::Medium
        } else {
            RelevanceTier::Low
        }
    }
}
