use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    SoftPlus,
    ReLU,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::Tanh => x.tanh(),
            // ln(1 + e^x), arranged so e^x never overflows.
            ActivationFunction::SoftPlus => x.max(0.0) + (-x.abs()).exp().ln_1p(),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
        }
    }

    /// Derivative evaluated at the pre-activation input `x`, not at the output.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                // e^x / (e^x + 1)^2, mirrored for x > 0 so the exponent stays <= 0.
                let e = (-x.abs()).exp();
                e / ((e + 1.0) * (e + 1.0))
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::SoftPlus => 1.0 / (1.0 + (-x).exp()),
            // The derivative at exactly 0 is taken to be 0.
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
        }
    }

    /// Element-wise activation over a batch.
    pub fn eval(&self, z: &Matrix) -> Matrix {
        z.map(|x| self.function(x))
    }

    /// Element-wise derivative over a batch.
    pub fn deriv(&self, z: &Matrix) -> Matrix {
        z.map(|x| self.derivative(x))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::SoftPlus => "softplus",
            ActivationFunction::ReLU => "relu",
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActivationFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sigmoid" | "sig" | "s" => Ok(ActivationFunction::Sigmoid),
            "tanh" | "t" => Ok(ActivationFunction::Tanh),
            "softplus" | "sp" => Ok(ActivationFunction::SoftPlus),
            "relu" | "r" => Ok(ActivationFunction::ReLU),
            _ => Err(format!("Unrecognized activation function: {:?}", s)),
        }
    }
}
