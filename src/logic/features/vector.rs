//! Feature Vector - Core data structure for model input
//!
//! Versioned feature vector plus the runtime extraction from a raw sensor
//! entry. Missing entry fields are defaulted, never rejected: an entry with
//! no reading scores as a nominal one, and an entry with no history scores
//! with a zero delta.

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_VERSION};
use crate::constants::DEFAULT_FLOW_RATE;
use crate::logic::store::SensorEntry;

/// Versioned feature vector with layout metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create from raw values with current version
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Validate that this vector is compatible with current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// RUNTIME EXTRACTION
// ============================================================================

/// Compute the feature vector for one sensor entry.
///
/// The hour-of-day feature is the wall-clock hour at evaluation time, not the
/// entry's own timestamp. The deployed model was fitted against scoring-time
/// hours, so callers must not "fix" this to the reading's timestamp.
pub fn compute_features(entry: &SensorEntry) -> FeatureVector {
    compute_features_at(entry, Local::now().hour())
}

/// Compute the feature vector with an explicit hour (deterministic tests).
pub fn compute_features_at(entry: &SensorEntry, hour: u32) -> FeatureVector {
    let flow = entry.flow_rate.unwrap_or(DEFAULT_FLOW_RATE);
    // No history means no movement: delta defaults to zero.
    let prev_flow = entry.prev_flow.unwrap_or(flow);

    let flow_delta = flow - prev_flow;
    let roll_mean = (flow + prev_flow) / 2.0;

    FeatureVector::from_values([flow, flow_delta, roll_mean, f64::from(hour)])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry_from(value: serde_json::Value) -> SensorEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_feature_vector_validation() {
        let vector = FeatureVector::from_values([1.0, 2.0, 3.0, 4.0]);
        assert!(vector.validate().is_ok());

        let stale = FeatureVector {
            version: FEATURE_VERSION + 1,
            ..vector
        };
        assert!(stale.validate().is_err());
    }

    #[test]
    fn test_defaults_when_entry_is_empty() {
        let entry = entry_from(json!({}));
        let features = compute_features_at(&entry, 12);

        assert_eq!(features.values, [50.0, 0.0, 50.0, 12.0]);
    }

    #[test]
    fn test_missing_prev_flow_gives_zero_delta() {
        let entry = entry_from(json!({ "flowRate": 37.5 }));
        let features = compute_features_at(&entry, 0);

        assert_eq!(features.values[0], 37.5);
        assert_eq!(features.values[1], 0.0);
        assert_eq!(features.values[2], 37.5);
    }

    #[test]
    fn test_delta_and_rolling_mean() {
        let entry = entry_from(json!({ "flowRate": 30.0, "prev_flow": 50.0 }));
        let features = compute_features_at(&entry, 9);

        assert_eq!(features.values, [30.0, -20.0, 40.0, 9.0]);
    }

    #[test]
    fn test_wall_clock_hour_in_range() {
        let entry = entry_from(json!({ "flowRate": 48.0 }));
        let features = compute_features(&entry);

        let hour = features.values[3];
        assert!((0.0..24.0).contains(&hour));
        assert_eq!(hour.fract(), 0.0);
    }
}
