//! Shared RANSAC settings and minimal-sample drawing.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Settings shared by the plane and circle RANSAC fitters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RansacParams {
    /// Upper bound on sampled hypotheses.
    pub max_iterations: usize,
    /// Maximum point-to-model distance for an inlier.
    pub distance_threshold: f64,
    /// RNG seed; identical inputs and seeds give identical models.
    pub seed: u64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            distance_threshold: 0.01,
            seed: 42,
        }
    }
}

/// Draw `k` distinct indices from `0..n` with a partial Fisher–Yates shuffle.
pub(crate) fn sample_indices<R: Rng>(rng: &mut R, n: usize, k: usize) -> Vec<usize> {
    debug_assert!(k <= n);
    let mut indices: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = rng.gen_range(i..n);
        indices.swap(i, j);
    }
    indices.truncate(k);
    indices
}
