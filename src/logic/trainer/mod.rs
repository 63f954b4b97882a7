//! Trainer Module - Offline Model Fitting
//!
//! Separate lifecycle from the monitoring daemon: synthesize flow history,
//! derive training features, fit the isolation forest, persist the artifact
//! the daemon loads at startup.
//!
//! Training features intentionally differ from runtime extraction in one
//! respect: hour-of-day comes from each sample's own timestamp here, while
//! the runtime uses the scoring-time wall clock. Both behaviors are part of
//! the deployed contract and must not be unified unilaterally.

pub mod synth;

use std::path::PathBuf;

use chrono::Timelike;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use self::synth::{generate_series, DropWindow, FlowSample, SeriesConfig};
use crate::constants;
use crate::logic::features::FEATURE_COUNT;
use crate::logic::model::artifact::ArtifactError;
use crate::logic::model::{artifact, ForestConfig, IsolationForest, ModelArtifact, ModelError, ModelMetadata};

/// Rolling-mean window over the training series
const ROLL_WINDOW: usize = 3;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
pub struct TrainError(pub String);

impl std::fmt::Display for TrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrainError: {}", self.0)
    }
}

impl std::error::Error for TrainError {}

impl From<ModelError> for TrainError {
    fn from(e: ModelError) -> Self {
        Self(e.to_string())
    }
}

impl From<ArtifactError> for TrainError {
    fn from(e: ArtifactError) -> Self {
        Self(e.to_string())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub forest: ForestConfig,
    pub output_path: PathBuf,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            output_path: constants::get_model_path(),
        }
    }
}

// ============================================================================
// FEATURE DERIVATION
// ============================================================================

/// Build the row-per-sample training matrix.
///
/// Per sample: raw flow, first-difference delta (0 for the first sample),
/// rolling mean over the last `ROLL_WINDOW` samples with the warm-up
/// positions backfilled by the raw flow, and the sample's own hour-of-day.
pub fn build_feature_matrix(samples: &[FlowSample]) -> Result<Array2<f64>, TrainError> {
    let mut flat = Vec::with_capacity(samples.len() * FEATURE_COUNT);

    for (i, sample) in samples.iter().enumerate() {
        let delta = if i == 0 {
            0.0
        } else {
            sample.flow - samples[i - 1].flow
        };

        let roll_mean = if i + 1 < ROLL_WINDOW {
            sample.flow
        } else {
            samples[i + 1 - ROLL_WINDOW..=i]
                .iter()
                .map(|s| s.flow)
                .sum::<f64>()
                / ROLL_WINDOW as f64
        };

        flat.extend_from_slice(&[sample.flow, delta, roll_mean, f64::from(sample.ts.hour())]);
    }

    Array2::from_shape_vec((samples.len(), FEATURE_COUNT), flat)
        .map_err(|e| TrainError(e.to_string()))
}

// ============================================================================
// TRAINING
// ============================================================================

/// The anomaly fixture: one undisturbed day plus one day with a sustained
/// 25 l/min depression between minutes 400 and 520.
fn training_samples(seed: u64) -> Result<Vec<FlowSample>, TrainError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut samples = generate_series(&SeriesConfig::default(), &mut rng)?;
    samples.extend(generate_series(
        &SeriesConfig {
            drop: Some(DropWindow {
                start: 400,
                magnitude: 25.0,
                len: 120,
            }),
            ..Default::default()
        },
        &mut rng,
    )?);

    Ok(samples)
}

/// Fit a model on the synthesized training set.
pub fn train(config: &TrainConfig) -> Result<ModelArtifact, TrainError> {
    let samples = training_samples(config.forest.seed)?;
    log::info!("Training on {} synthesized samples", samples.len());

    let features = build_feature_matrix(&samples)?;
    let forest = IsolationForest::fit(&features, &config.forest)?;

    Ok(ModelArtifact::new(
        ModelMetadata::for_fit(&config.forest),
        forest,
    )?)
}

/// Fit and persist; returns the artifact path.
pub fn train_and_save(config: &TrainConfig) -> Result<PathBuf, TrainError> {
    let model_artifact = train(config)?;
    artifact::save(&config.output_path, &model_artifact)?;
    Ok(config.output_path.clone())
}

// ============================================================================
// TESTS
// ============================================================================
