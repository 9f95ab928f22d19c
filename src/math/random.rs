use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::math::matrix::Matrix;

/// The single source of randomness for a training run.
///
/// Weight initialization, per-epoch shuffling and misclassified-sample
/// selection all draw from one instance passed by `&mut`, so a run is fully
/// reproducible from its seed.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Seeds from operating-system entropy.
    pub fn from_entropy() -> RandomSource {
        RandomSource { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> RandomSource {
        RandomSource { rng: StdRng::seed_from_u64(seed) }
    }

    /// One draw from N(0, 1).
    pub fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    pub fn normal_vector(&mut self, len: usize) -> Vec<f64> {
        (0..len).map(|_| self.standard_normal()).collect()
    }

    /// A `rows × cols` matrix of independent N(0, 1) draws.
    pub fn normal_matrix(&mut self, rows: usize, cols: usize) -> Matrix {
        let data = (0..rows).map(|_| self.normal_vector(cols)).collect();
        Matrix { rows, cols, data }
    }

    /// A uniformly random permutation of `0..n`.
    pub fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut self.rng);
        indices
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        RandomSource::from_entropy()
    }
}
