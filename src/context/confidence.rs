//! Coarse confidence assessment over consolidated result statistics.

use crate::config::RetrievalConfig;
use crate::types::{ConfidenceLevel, ConsolidatedContext};
use std::sync::Arc;

/// Derives a confidence label from the consolidated context.
///
/// The label is advisory: an empty or weak context assesses as low rather
/// than erroring, and the caller decides whether low confidence should
/// block answer generation.
pub struct ConfidenceAssessor {
    config: Arc<RetrievalConfig>,
}

impl ConfidenceAssessor {
    pub fn new(config: Arc<RetrievalConfig>) -> Self {
        Self { config }
    }

    /// Assessment rules, checked in order:
    /// - high: at least 2 sources, average score above `t_high`, and a
    ///   single dominant category
    /// - medium: at least 1 source scoring above `t_medium`
    /// - low: everything else, including an empty source list
    pub fn assess(&self, context: &ConsolidatedContext) -> ConfidenceLevel {
        let s = &self.config.scoring;

        if context.sources.len() >= 2
            && context.average_score > s.t_high
            && context.dominant_category != "mixed"
        {
            return ConfidenceLevel::High;
        }

        if context.sources.iter().any(|source| source.score > s.t_medium) {
            return ConfidenceLevel::Medium;
        }

        ConfidenceLevel::Low
    }
}
