//! Nearest-neighbor search against the vector store.

pub mod client;

pub use client::VectorSearchClient;
