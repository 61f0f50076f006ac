//! Embedding provider trait: text in, fixed-length vector out.

use async_trait::async_trait;
use thiserror::Error;

/// Provider-level failure, classified so the gateway can decide whether a
/// retry is worthwhile.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Timeout, rate limit, or transport hiccup; retryable
    #[error("Transient embedding failure: {0}")]
    Transient(String),

    /// Bad credentials, malformed input, or provider-side rejection;
    /// retrying cannot help
    #[error("Permanent embedding failure: {0}")]
    Permanent(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

/// Maps text to a fixed-length numeric vector.
///
/// Implementations must be deterministic: identical input text produces
/// numerically identical vectors, whether embedded singly or in a batch.
/// `embed_many` preserves input order and returns exactly one vector per
/// input.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::Transient("429".to_string()).is_transient());
        assert!(!ProviderError::Permanent("401".to_string()).is_transient());
    }
}
