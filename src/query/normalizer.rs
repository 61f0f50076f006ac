//! Query preprocessing: cleanup, category inference, keyword extraction.

use crate::config::{CategoryRule, RetrievalConfig};
use crate::errors::{RetrievalError, Result};
use crate::types::Query;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Minimum token length kept during keyword extraction
const MIN_TOKEN_LEN: usize = 3;

/// Tokens dropped during keyword extraction regardless of length
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "what", "which", "how", "why", "when", "where", "who", "does",
    "this", "that", "with", "from", "into", "about", "can", "must", "should", "has", "have",
];

/// Normalizes raw query text into a [`Query`]: trims and collapses
/// whitespace, lowercases the matching form, infers a category from an
/// ordered rule list, and extracts salient keywords.
pub struct QueryNormalizer {
    config: Arc<RetrievalConfig>,
}

impl QueryNormalizer {
    pub fn new(config: Arc<RetrievalConfig>) -> Self {
        Self { config }
    }

    /// Normalize raw text into a query. Fails with `EmptyQuery` when the
    /// text is zero-length after trimming.
    pub fn normalize(&self, raw_text: &str) -> Result<Query> {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }

        // Collapse internal whitespace runs and lowercase for matching;
        // raw_text is preserved verbatim for display and logging.
        let normalized_text = trimmed
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let tokens = tokenize(&normalized_text);
        let keywords = extract_keywords(&tokens);

        let matched_rule = self.match_category(&tokens);
        let inferred_category = matched_rule.map(|r| r.category.clone());
        let expansion_terms = matched_rule
            .map(|r| r.expansion_terms.clone())
            .unwrap_or_default();

        Ok(Query {
            raw_text: raw_text.to_string(),
            normalized_text,
            inferred_category,
            keywords,
            expansion_terms,
        })
    }

    /// First rule whose keyword set intersects the query tokens wins.
    /// Declaration order in the config is the documented precedence; this
    /// is a heuristic, not a classifier.
    fn match_category(&self, tokens: &[String]) -> Option<&CategoryRule> {
        self.config
            .category_rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| tokens.iter().any(|t| t == kw)))
    }
}

/// Split on non-alphanumeric boundaries, keeping original token order
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Drop short tokens and stopwords, collapse duplicates
fn extract_keywords(tokens: &[String]) -> BTreeSet<String> {
    tokens
        .iter()
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !STOPWORDS.contains(&t.as_str()))
        .cloned()
        .collect()
}
