use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cost::cost_function::CostFunction;
use crate::data::dataset::RemainderPolicy;
use crate::error::{Error, Result};
use crate::optim::sgd::UpdatePolicy;

/// Hyperparameters and options for one `Network::train` run.
///
/// # Fields
/// - `learning_rate`: SGD step size α
/// - `epochs`: number of full passes over the training split
/// - `batch_size`: examples per mini-batch; `1` is online SGD
/// - `cost`: cost function used for gradients and reporting
/// - `lambda`: L2 weight decay strength λ (`0` disables it)
/// - `evaluate_validation`: evaluate the validation split after each epoch
/// - `evaluate_test`: evaluate the test split after each epoch
/// - `update_policy`: when layers apply their updates
/// - `remainder`: what to do with a final undersized batch
/// - `history`: optional CSV file receiving one row per epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub cost: CostFunction,
    pub lambda: f64,
    pub evaluate_validation: bool,
    pub evaluate_test: bool,
    pub update_policy: UpdatePolicy,
    pub remainder: RemainderPolicy,
    pub history: Option<PathBuf>,
}

impl TrainConfig {
    /// Plain SGD with no weight decay, no per-epoch evaluation and no history.
    pub fn new(learning_rate: f64, epochs: usize, batch_size: usize, cost: CostFunction) -> Self {
        TrainConfig {
            learning_rate,
            epochs,
            batch_size,
            cost,
            lambda: 0.0,
            evaluate_validation: false,
            evaluate_test: false,
            update_policy: UpdatePolicy::default(),
            remainder: RemainderPolicy::default(),
            history: None,
        }
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.evaluate_validation = enabled;
        self
    }

    pub fn with_test(mut self, enabled: bool) -> Self {
        self.evaluate_test = enabled;
        self
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    pub fn with_remainder(mut self, policy: RemainderPolicy) -> Self {
        self.remainder = policy;
        self
    }

    pub fn with_history(mut self, path: impl Into<PathBuf>) -> Self {
        self.history = Some(path.into());
        self
    }

    /// Rejects settings that cannot produce a meaningful run on a training
    /// split of `training_size` examples.
    pub fn validate(&self, training_size: usize) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch size must be at least 1".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return Err(Error::InvalidConfig(format!("lambda must be non-negative, got {}", self.lambda)));
        }
        if training_size == 0 {
            return Err(Error::InvalidConfig("the training split is empty".into()));
        }
        if self.remainder == RemainderPolicy::Drop && self.batch_size > training_size {
            return Err(Error::InvalidConfig(format!(
                "batch size {} exceeds the {} training examples, so dropping the remainder leaves no batches",
                self.batch_size, training_size
            )));
        }
        Ok(())
    }
}
