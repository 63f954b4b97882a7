//! Features Module - Feature Extraction Engine
//!
//! Derives the fixed-length numeric representation the outlier model
//! consumes from one raw sensor entry.

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::{compute_features, compute_features_at, FeatureVector};
