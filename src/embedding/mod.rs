//! Embedding provider boundary and the gateway that adds retry and
//! batch-fallback semantics shared by ingestion and querying.

pub mod gateway;
pub mod http;
pub mod provider;

pub use gateway::EmbeddingGateway;
pub use http::HttpEmbeddingProvider;
pub use provider::{EmbeddingProvider, ProviderError};
