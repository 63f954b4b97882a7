//! Model Artifact - Persistence Format
//!
//! JSON document `{ metadata, checksum, model }` written by the offline
//! trainer and loaded once at daemon startup. The checksum covers the
//! serialized model; the metadata records the feature layout the model was
//! fitted against. Either mismatching is a fatal startup error: scoring with
//! a corrupt or schema-incompatible model silently mis-annotates entries.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::forest::{ForestConfig, IsolationForest};
use crate::logic::features::layout::{layout_hash, validate_layout};
use crate::logic::features::FEATURE_VERSION;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_type: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub n_estimators: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
    pub trained_at: DateTime<Utc>,
}

impl ModelMetadata {
    pub fn for_fit(config: &ForestConfig) -> Self {
        Self {
            model_type: "isolation_forest".to_string(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            n_estimators: config.n_estimators,
            max_samples: config.max_samples,
            contamination: config.contamination,
            seed: config.seed,
            trained_at: Utc::now(),
        }
    }
}

/// Persisted artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ModelMetadata,
    /// Hex SHA-256 of the serialized model
    pub checksum: String,
    pub model: IsolationForest,
}

impl ModelArtifact {
    pub fn new(metadata: ModelMetadata, model: IsolationForest) -> Result<Self, ArtifactError> {
        let checksum = model_checksum(&model)?;
        Ok(Self {
            metadata,
            checksum,
            model,
        })
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
pub enum ArtifactError {
    Io(String),
    Parse(String),
    ChecksumMismatch,
    LayoutMismatch(String),
}

impl std::fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Artifact I/O error: {}", e),
            Self::Parse(e) => write!(f, "Artifact parse error: {}", e),
            Self::ChecksumMismatch => write!(f, "Artifact checksum mismatch"),
            Self::LayoutMismatch(e) => write!(f, "Artifact layout mismatch: {}", e),
        }
    }
}

impl std::error::Error for ArtifactError {}

// ============================================================================
// SAVE / LOAD
// ============================================================================

fn model_checksum(model: &IsolationForest) -> Result<String, ArtifactError> {
    let bytes = serde_json::to_vec(model).map_err(|e| ArtifactError::Parse(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Write the artifact, creating parent directories as needed.
pub fn save(path: &Path, artifact: &ModelArtifact) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ArtifactError::Io(e.to_string()))?;
    }

    let json =
        serde_json::to_string_pretty(artifact).map_err(|e| ArtifactError::Parse(e.to_string()))?;
    fs::write(path, json).map_err(|e| ArtifactError::Io(e.to_string()))?;

    log::info!("Model artifact saved to {}", path.display());
    Ok(())
}

/// Load and verify an artifact. Any failure here is fatal to the daemon:
/// there is no fallback model.
pub fn load(path: &Path) -> Result<ModelArtifact, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|e| ArtifactError::Io(e.to_string()))?;

    let artifact: ModelArtifact =
        serde_json::from_str(&content).map_err(|e| ArtifactError::Parse(e.to_string()))?;

    if model_checksum(&artifact.model)? != artifact.checksum {
        return Err(ArtifactError::ChecksumMismatch);
    }

    validate_layout(artifact.metadata.feature_version, artifact.metadata.layout_hash)
        .map_err(|e| ArtifactError::LayoutMismatch(e.to_string()))?;

    log::info!(
        "Model loaded: {} ({} trees, trained {})",
        artifact.metadata.model_type,
        artifact.metadata.n_estimators,
        artifact.metadata.trained_at
    );
    Ok(artifact)
}

// ============================================================================
// TESTS
// ============================================================================
