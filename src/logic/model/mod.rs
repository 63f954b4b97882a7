//! Model Module - Outlier Model & Scoring
//!
//! - `forest` - isolation forest: fitting and decision scores
//! - `scorer` - verdict policy on top of a decision score
//! - `artifact` - persisted model format shared with the offline trainer

pub mod artifact;
pub mod forest;
pub mod scorer;

// Re-export common types
pub use artifact::{ModelArtifact, ModelMetadata};
pub use forest::{ForestConfig, IsolationForest};
pub use scorer::{AnomalyScorer, DecisionModel, Verdict};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
pub struct ModelError(pub String);

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ModelError: {}", self.0)
    }
}

impl std::error::Error for ModelError {}
