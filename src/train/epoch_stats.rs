use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-epoch training statistics returned by `train_loop`.
///
/// Serializes to one row of the history CSV; disabled evaluations become
/// empty fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number, continuing across resumed runs.
    pub epoch: usize,
    /// Last epoch number of the current run.
    #[serde(skip)]
    pub total_epochs: usize,
    /// Fraction of training examples classified correctly during the epoch.
    pub train_accuracy: f64,
    /// Mean training cost over the examples seen during the epoch.
    pub train_cost: f64,
    pub validation_accuracy: Option<f64>,
    pub validation_cost: Option<f64>,
    pub test_accuracy: Option<f64>,
    pub test_cost: Option<f64>,
    /// Wall time of the epoch including its evaluations.
    #[serde(skip)]
    pub elapsed_ms: u64,
}

impl fmt::Display for EpochStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "epoch {}/{}: training accuracy {:.2}%, cost {:.6}",
            self.epoch,
            self.total_epochs,
            self.train_accuracy * 100.0,
            self.train_cost
        )?;
        if let (Some(acc), Some(cost)) = (self.validation_accuracy, self.validation_cost) {
            write!(f, "; validation accuracy {:.2}%, cost {:.6}", acc * 100.0, cost)?;
        }
        if let (Some(acc), Some(cost)) = (self.test_accuracy, self.test_cost) {
            write!(f, "; test accuracy {:.2}%, cost {:.6}", acc * 100.0, cost)?;
        }
        Ok(())
    }
}
