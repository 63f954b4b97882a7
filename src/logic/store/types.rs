//! Sensor entry and annotation payloads.
//!
//! Field names are fixed by the store schema (`flowRate`, `prev_flow`, ...);
//! unknown fields are preserved through a read-modify cycle via the flattened
//! extra map.

use serde::{Deserialize, Serialize};

/// Categorical verdict attached to a scored entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeakStatus {
    Leak,
    Normal,
}

impl std::fmt::Display for LeakStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leak => write!(f, "Leak"),
            Self::Normal => write!(f, "Normal"),
        }
    }
}

/// One timestamped flow measurement as stored.
///
/// Every field is optional: ingestion paths outside this service write
/// partial records, and scoring defaults what is missing instead of
/// rejecting the entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorEntry {
    #[serde(rename = "flowRate", skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_flow: Option<f64>,

    /// ISO-8601 reading time, assigned by the ingestion path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeakStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_loss: Option<f64>,

    /// Fields this service does not interpret but must not drop
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SensorEntry {
    /// An entry carrying both a status and a confidence has already been
    /// scored and must never be re-scored.
    pub fn is_processed(&self) -> bool {
        self.status.is_some() && self.confidence.is_some()
    }

    /// Merge annotation fields into this entry, leaving the rest untouched.
    pub fn apply_annotation(&mut self, annotation: &Annotation) {
        self.status = Some(annotation.status);
        self.confidence = Some(annotation.confidence);
        self.estimated_loss = Some(annotation.estimated_loss);
        self.timestamp = Some(annotation.timestamp.clone());
    }
}

/// The scoring output written back onto a sensor entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub status: LeakStatus,
    /// Percentage in [0, 100], rounded to 2 decimals
    pub confidence: f64,
    /// Percentage in [0, 100], rounded to 2 decimals
    pub estimated_loss: f64,
    /// Carried through from the source entry, or scoring time if absent
    pub timestamp: String,
}
