//! Context consolidation and confidence assessment.

pub mod confidence;
pub mod consolidator;

pub use confidence::ConfidenceAssessor;
pub use consolidator::ContextConsolidator;
