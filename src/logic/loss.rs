//! Loss Estimator
//!
//! Estimates the percentage of expected flow currently unaccounted for.
//! Independent of the anomaly verdict: a "Normal" entry can still carry a
//! small positive loss when its flow sits below baseline but above the
//! anomaly threshold.

use crate::constants::DEFAULT_FLOW_RATE;
use crate::logic::store::SensorEntry;

/// Round a percentage to 2 decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimated water loss in [0, 100], as a percentage of `expected_flow`.
///
/// Flow at or above the expected baseline estimates zero loss; flow at zero
/// estimates total loss. Missing readings default to the nominal flow.
pub fn estimate_loss(entry: &SensorEntry, expected_flow: f64) -> f64 {
    let flow = entry.flow_rate.unwrap_or(DEFAULT_FLOW_RATE);
    let deficit = (expected_flow - flow).max(0.0);
    round2(deficit / expected_flow * 100.0)
}
