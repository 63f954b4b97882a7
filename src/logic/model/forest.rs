//! Isolation Forest
//!
//! Ensemble of randomized binary trees. Outliers sit in sparse regions and
//! isolate in few splits, so their average path length is short; the score
//! normalizes path length against the expected depth for the sub-sample size
//! (Liu et al. 2008).
//!
//! Score convention matches the artifact's training side: the decision score
//! is the per-sample score minus the contamination-quantile offset computed
//! at fit time, so more negative values mean stronger outlier evidence and
//! roughly `contamination` of the training data scores below zero.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::ModelError;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default ensemble size
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Default per-tree sub-sample size
pub const DEFAULT_MAX_SAMPLES: usize = 256;

/// Default expected fraction of anomalous training samples
pub const DEFAULT_CONTAMINATION: f64 = 0.1;

/// Default seed for reproducible fits
pub const DEFAULT_SEED: u64 = 42;

const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_9;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Fit-time configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_samples: DEFAULT_MAX_SAMPLES,
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_SEED,
        }
    }
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        size: usize,
    },
}

/// A fitted isolation forest. Immutable after fitting; safe to share
/// read-only for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<TreeNode>,
    sample_size: usize,
    n_features: usize,
    offset: f64,
}

impl IsolationForest {
    /// Fit a forest on a row-per-sample feature matrix.
    pub fn fit(data: &Array2<f64>, config: &ForestConfig) -> Result<Self, ModelError> {
        let n = data.nrows();
        if n < 2 {
            return Err(ModelError(format!(
                "training set needs at least 2 samples, got {}",
                n
            )));
        }
        if !(config.contamination > 0.0 && config.contamination <= 0.5) {
            return Err(ModelError(format!(
                "contamination must be in (0, 0.5], got {}",
                config.contamination
            )));
        }
        if config.n_estimators == 0 {
            return Err(ModelError("n_estimators must be positive".to_string()));
        }

        let sample_size = config.max_samples.min(n);
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut trees = Vec::with_capacity(config.n_estimators);
        for _ in 0..config.n_estimators {
            let indices = rand::seq::index::sample(&mut rng, n, sample_size).into_vec();
            trees.push(build_tree(data, &indices, 0, height_limit, &mut rng));
        }

        let mut forest = Self {
            trees,
            sample_size,
            n_features: data.ncols(),
            offset: 0.0,
        };

        // Offset at the contamination quantile of the training scores, so
        // decision scores are negative for roughly that fraction of samples.
        let mut scores: Vec<f64> = (0..n)
            .map(|i| forest.score_sample(&data.row(i).to_vec()))
            .collect();
        scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        forest.offset = percentile_sorted(&scores, config.contamination * 100.0);

        Ok(forest)
    }

    /// Decision score for one feature vector: more negative means stronger
    /// outlier evidence.
    pub fn decision_function(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(ModelError("non-finite feature value".to_string()));
        }

        Ok(self.score_sample(features) - self.offset)
    }

    /// Number of features the forest was fitted on
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Per-sample score in (-1, 0): -2^(-E[h(x)] / c(sample_size))
    fn score_sample(&self, features: &[f64]) -> f64 {
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| path_length(tree, features, 0))
            .sum();
        let mean_depth = total / self.trees.len() as f64;

        -(2.0_f64).powf(-mean_depth / average_path_length(self.sample_size))
    }
}

// ============================================================================
// TREE CONSTRUCTION & TRAVERSAL
// ============================================================================

fn build_tree(
    data: &Array2<f64>,
    indices: &[usize],
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> TreeNode {
    if depth >= height_limit || indices.len() <= 1 {
        return TreeNode::Leaf {
            size: indices.len(),
        };
    }

    // Only features with spread inside this node can split it
    let mut candidates = Vec::new();
    for feature in 0..data.ncols() {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &i in indices {
            let v = data[[i, feature]];
            min = min.min(v);
            max = max.max(v);
        }
        if max > min {
            candidates.push((feature, min, max));
        }
    }
    if candidates.is_empty() {
        return TreeNode::Leaf {
            size: indices.len(),
        };
    }

    let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(min..max);

    let mut left = Vec::new();
    let mut right = Vec::new();
    for &i in indices {
        if data[[i, feature]] < threshold {
            left.push(i);
        } else {
            right.push(i);
        }
    }

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_tree(data, &left, depth + 1, height_limit, rng)),
        right: Box::new(build_tree(data, &right, depth + 1, height_limit, rng)),
    }
}

fn path_length(node: &TreeNode, features: &[f64], depth: usize) -> f64 {
    match node {
        TreeNode::Leaf { size } => depth as f64 + average_path_length(*size),
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if features[*feature] < *threshold {
                path_length(left, features, depth + 1)
            } else {
                path_length(right, features, depth + 1)
            }
        }
    }
}

/// Expected path length of an unsuccessful BST search over n samples
fn average_path_length(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    2.0 * ((n - 1.0).ln() + EULER_MASCHERONI) - 2.0 * (n - 1.0) / n
}

/// Linear-interpolation percentile over a sorted slice
fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Dense cluster near the origin plus one far-away point
    fn cluster_with_outlier() -> Array2<f64> {
        let mut rows = Vec::new();
        for i in 0..100 {
            let jitter = i as f64 * 0.01;
            rows.extend_from_slice(&[1.0 + jitter, 2.0 - jitter]);
        }
        rows.extend_from_slice(&[10.0, -10.0]);
        Array2::from_shape_vec((101, 2), rows).unwrap()
    }

    #[test]
    fn test_fit_rejects_degenerate_input() {
        let empty = Array2::<f64>::zeros((0, 4));
        assert!(IsolationForest::fit(&empty, &ForestConfig::default()).is_err());

        let data = Array2::<f64>::zeros((10, 4));
        let bad_contamination = ForestConfig {
            contamination: 0.0,
            ..Default::default()
        };
        assert!(IsolationForest::fit(&data, &bad_contamination).is_err());
    }

    #[test]
    fn test_outlier_scores_below_inliers() {
        let data = cluster_with_outlier();
        let forest = IsolationForest::fit(&data, &ForestConfig::default()).unwrap();

        let inlier = forest.decision_function(&[1.0, 2.0]).unwrap();
        let outlier = forest.decision_function(&[10.0, -10.0]).unwrap();

        assert!(
            outlier < inlier,
            "outlier {} should score below inlier {}",
            outlier,
            inlier
        );
    }

    #[test]
    fn test_fit_is_reproducible_for_a_seed() {
        let data = cluster_with_outlier();
        let config = ForestConfig::default();

        let a = IsolationForest::fit(&data, &config).unwrap();
        let b = IsolationForest::fit(&data, &config).unwrap();

        let sample = [1.05, 1.95];
        assert_eq!(
            a.decision_function(&sample).unwrap(),
            b.decision_function(&sample).unwrap()
        );
    }

    #[test]
    fn test_decision_function_checks_shape() {
        let data = cluster_with_outlier();
        let forest = IsolationForest::fit(&data, &ForestConfig::default()).unwrap();

        assert!(forest.decision_function(&[1.0]).is_err());
        assert!(forest.decision_function(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_offset_splits_training_scores() {
        // With contamination 0.1, about 10% of training rows score negative
        let data = cluster_with_outlier();
        let forest = IsolationForest::fit(&data, &ForestConfig::default()).unwrap();

        let negative = (0..data.nrows())
            .filter(|&i| {
                forest
                    .decision_function(&data.row(i).to_vec())
                    .unwrap()
                    < 0.0
            })
            .count();

        // Quantile interpolation makes the split approximate, not exact
        assert!(negative >= 5 && negative <= 20, "negative = {}", negative);
    }
}
