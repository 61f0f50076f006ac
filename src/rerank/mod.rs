//! Score enhancement and result reranking.

pub mod enhancer;
pub mod reranker;

pub use enhancer::ScoreEnhancer;
pub use reranker::ResultReranker;
