//! Query normalization and analysis.

pub mod normalizer;

pub use normalizer::QueryNormalizer;
