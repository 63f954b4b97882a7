//! Anomaly Scorer - Verdict Policy
//!
//! Translates a raw decision score into the categorical status and bounded
//! confidence written back to the store. The threshold and the confidence
//! formula are contractual constants: annotations must stay comparable
//! across deployments, so neither may be tuned here.

use serde::{Deserialize, Serialize};

use super::forest::IsolationForest;
use super::ModelError;
use crate::logic::features::FeatureVector;
use crate::logic::store::LeakStatus;

/// Decision scores below this are flagged as leaks. Policy constant, not
/// derived from training data.
pub const LEAK_SCORE_THRESHOLD: f64 = -0.1;

// ============================================================================
// DECISION MODEL TRAIT
// ============================================================================

/// A fitted outlier model: feature vector in, decision score out, where more
/// negative means stronger anomaly evidence. Kept as a trait so tests can
/// score against stub models.
pub trait DecisionModel {
    fn decision_function(&self, features: &[f64]) -> Result<f64, ModelError>;
}

impl DecisionModel for IsolationForest {
    fn decision_function(&self, features: &[f64]) -> Result<f64, ModelError> {
        IsolationForest::decision_function(self, features)
    }
}

// ============================================================================
// SCORER
// ============================================================================

/// Verdict for one reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub status: LeakStatus,
    /// Heuristic confidence in [0, 100]; decays with score magnitude in
    /// either direction, it is not a calibrated probability
    pub confidence: f64,
    pub raw_score: f64,
}

/// Wraps the loaded outlier model for the lifetime of the process
pub struct AnomalyScorer<M> {
    model: M,
}

impl<M: DecisionModel> AnomalyScorer<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Score one feature vector into a verdict.
    ///
    /// Fails per-entry (layout mismatch, model invocation error); callers
    /// skip the entry and continue.
    pub fn score(&self, features: &FeatureVector) -> Result<Verdict, ModelError> {
        features
            .validate()
            .map_err(|e| ModelError(e.to_string()))?;

        let raw_score = self.model.decision_function(features.as_slice())?;

        let status = if raw_score < LEAK_SCORE_THRESHOLD {
            LeakStatus::Leak
        } else {
            LeakStatus::Normal
        };

        let confidence = ((1.0 - raw_score.abs()) * 100.0).clamp(0.0, 100.0);

        Ok(Verdict {
            status,
            confidence,
            raw_score,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{FEATURE_VERSION, FeatureVector};

    /// Stub model returning a fixed decision score
    struct FixedScore(f64);

    impl DecisionModel for FixedScore {
        fn decision_function(&self, _features: &[f64]) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    struct FailingModel;

    impl DecisionModel for FailingModel {
        fn decision_function(&self, _features: &[f64]) -> Result<f64, ModelError> {
            Err(ModelError("incompatible model".to_string()))
        }
    }

    fn features() -> FeatureVector {
        FeatureVector::from_values([30.0, -20.0, 40.0, 9.0])
    }

    #[test]
    fn test_leak_threshold_boundary_is_exact() {
        let at_threshold = AnomalyScorer::new(FixedScore(-0.1))
            .score(&features())
            .unwrap();
        assert_eq!(at_threshold.status, LeakStatus::Normal);

        let below = AnomalyScorer::new(FixedScore(-0.1000001))
            .score(&features())
            .unwrap();
        assert_eq!(below.status, LeakStatus::Leak);
    }

    #[test]
    fn test_confidence_formula() {
        let verdict = AnomalyScorer::new(FixedScore(-0.3))
            .score(&features())
            .unwrap();
        assert_eq!(verdict.status, LeakStatus::Leak);
        assert!((verdict.confidence - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_clamped_to_percentage_range() {
        let extreme = AnomalyScorer::new(FixedScore(-5.0))
            .score(&features())
            .unwrap();
        assert_eq!(extreme.confidence, 0.0);

        let zero = AnomalyScorer::new(FixedScore(0.0))
            .score(&features())
            .unwrap();
        assert_eq!(zero.confidence, 100.0);
        assert_eq!(zero.status, LeakStatus::Normal);

        // Very positive scores also decay confidence; that conflation is
        // part of the contract
        let very_normal = AnomalyScorer::new(FixedScore(2.0))
            .score(&features())
            .unwrap();
        assert_eq!(very_normal.confidence, 0.0);
        assert_eq!(very_normal.status, LeakStatus::Normal);
    }

    #[test]
    fn test_model_failure_propagates() {
        let result = AnomalyScorer::new(FailingModel).score(&features());
        assert!(result.is_err());
    }

    #[test]
    fn test_layout_mismatch_is_rejected_before_the_model() {
        let mut stale = features();
        stale.version = FEATURE_VERSION + 1;

        let result = AnomalyScorer::new(FixedScore(0.0)).score(&stale);
        assert!(result.is_err());
    }
}
