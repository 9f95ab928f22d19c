use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::cost::cross_entropy::CrossEntropy;
use crate::cost::mse::MeanSquaredError;
use crate::math::matrix::Matrix;

/// Selects which cost the training loop minimizes.
///
/// - `MeanSquaredError`: half squared error; works with any output activation.
/// - `CrossEntropy`: binary cross-entropy per output; pair with a Sigmoid
///   output layer so predictions stay in (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    MeanSquaredError,
    CrossEntropy,
}

impl CostFunction {
    /// Scalar cost summed over every column of the batch.
    pub fn eval(&self, predicted: &Matrix, target: &Matrix) -> f64 {
        match self {
            CostFunction::MeanSquaredError => MeanSquaredError::eval(predicted, target),
            CostFunction::CrossEntropy     => CrossEntropy::eval(predicted, target),
        }
    }

    /// Gradient of the cost w.r.t. `predicted`, same shape.
    pub fn deriv(&self, predicted: &Matrix, target: &Matrix) -> Matrix {
        match self {
            CostFunction::MeanSquaredError => MeanSquaredError::deriv(predicted, target),
            CostFunction::CrossEntropy     => CrossEntropy::deriv(predicted, target),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CostFunction::MeanSquaredError => "mse",
            CostFunction::CrossEntropy     => "cross-entropy",
        }
    }
}

impl fmt::Display for CostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CostFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mse" | "mean-squared-error" | "mean_squared_error" => Ok(CostFunction::MeanSquaredError),
            "ce" | "cross-entropy" | "cross_entropy" | "crossentropy" => Ok(CostFunction::CrossEntropy),
            _ => Err(format!("Unrecognized cost function: {:?}", s)),
        }
    }
}
