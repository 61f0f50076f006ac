//! Error types for the retrieval core.
//!
//! The taxonomy separates infrastructure failures (embedding provider or
//! vector store unreachable) from legitimate empty outcomes: a query with
//! no usable context is not a fault, and callers must be able to tell the
//! two apart.

use thiserror::Error;

/// Main error type for retrieval operations
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Query was empty after trimming whitespace
    #[error("Query is empty after normalization")]
    EmptyQuery,

    /// Embedding provider exhausted its retries
    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Vector store unreachable or search failed
    #[error("Vector store unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Valid query, but no usable candidates survived filtering and dedup
    #[error("No relevant context found for query")]
    NoRelevantContext,

    /// Invalid thresholds or scoring constants at startup
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RetrievalError {
    /// True for errors that indicate a failing dependency rather than a
    /// legitimate empty outcome or bad input. Callers surface these as
    /// service-unavailable conditions.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            RetrievalError::EmbeddingUnavailable(_) | RetrievalError::RetrievalUnavailable(_)
        )
    }
}

/// Result type alias for retrieval operations
pub type Result<T> = std::result::Result<T, RetrievalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RetrievalError::EmbeddingUnavailable("timeout after 3 attempts".to_string());
        assert!(err.to_string().contains("timeout after 3 attempts"));

        let err = RetrievalError::Config("t_medium must be below t_high".to_string());
        assert!(err.to_string().contains("t_medium"));
    }

    #[test]
    fn test_no_context_is_not_infrastructure() {
        assert!(!RetrievalError::NoRelevantContext.is_infrastructure());
        assert!(!RetrievalError::EmptyQuery.is_infrastructure());
        assert!(RetrievalError::RetrievalUnavailable("down".to_string()).is_infrastructure());
        assert!(RetrievalError::EmbeddingUnavailable("down".to_string()).is_infrastructure());
    }
}
