use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::{math::matrix::Matrix, layers::dense::Layer};

/// When a layer applies the gradients computed in its backward pass.
///
/// - `Immediate`: update weights inside `Layer::backward`, averaged over the
///   columns of the batch just propagated.
/// - `Accumulate`: add gradients to the layer's accumulators; `Layer::flush`
///   later applies their average and clears them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    #[default]
    Immediate,
    Accumulate,
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdatePolicy::Immediate => "immediate",
            UpdatePolicy::Accumulate => "accumulate",
        })
    }
}

impl FromStr for UpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "immediate" => Ok(UpdatePolicy::Immediate),
            "accumulate" => Ok(UpdatePolicy::Accumulate),
            _ => Err(format!("Unrecognized update policy: {:?}", s)),
        }
    }
}

/// Plain stochastic gradient descent with optional L2 weight decay.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
    /// L2 regularization strength; 0 disables weight decay.
    pub lambda: f64,
    /// Size of the full training set, the `n` in the decay term `α·λ/n`.
    pub training_size: usize,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate, lambda: 0.0, training_size: 0 }
    }

    pub fn with_weight_decay(mut self, lambda: f64, training_size: usize) -> Sgd {
        self.lambda = lambda;
        self.training_size = training_size;
        self
    }

    /// Per-step shrink factor applied to the weights, `α·λ/n`.
    pub fn decay(&self) -> f64 {
        if self.lambda > 0.0 && self.training_size > 0 {
            self.learning_rate * self.lambda / self.training_size as f64
        } else {
            0.0
        }
    }

    /// Applies one update from gradients summed over `batch_size` examples.
    pub fn step(&self, layer: &mut Layer, weights_grad: &Matrix, biases_grad: &[f64], batch_size: usize) {
        let scale = self.learning_rate / batch_size.max(1) as f64;
        layer.apply_gradients(weights_grad, biases_grad, scale, self.decay());
    }
}
