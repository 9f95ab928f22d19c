use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::math::{matrix::Matrix, random::RandomSource};

/// Weight-initialization scheme for a freshly built layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    /// Weights and biases drawn from N(0, 1).
    #[default]
    StandardNormal,
    /// Weights from N(0, 1/fan_in), zero biases. Suits Sigmoid/Tanh layers.
    Xavier,
    /// Weights from N(0, 2/fan_in), zero biases. Suits ReLU layers.
    He,
}

impl Initializer {
    /// A `n_outputs × n_inputs` weight matrix; `n_inputs` is the fan-in.
    pub fn weights(&self, n_inputs: usize, n_outputs: usize, rng: &mut RandomSource) -> Matrix {
        let raw = rng.normal_matrix(n_outputs, n_inputs);
        match self {
            Initializer::StandardNormal => raw,
            Initializer::Xavier => raw.scale((1.0 / n_inputs.max(1) as f64).sqrt()),
            Initializer::He => raw.scale((2.0 / n_inputs.max(1) as f64).sqrt()),
        }
    }

    pub fn biases(&self, n_outputs: usize, rng: &mut RandomSource) -> Vec<f64> {
        match self {
            Initializer::StandardNormal => rng.normal_vector(n_outputs),
            Initializer::Xavier | Initializer::He => vec![0.0; n_outputs],
        }
    }
}

impl fmt::Display for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Initializer::StandardNormal => "normal",
            Initializer::Xavier => "xavier",
            Initializer::He => "he",
        })
    }
}

impl FromStr for Initializer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" | "standard-normal" | "standard_normal" => Ok(Initializer::StandardNormal),
            "xavier" | "glorot" => Ok(Initializer::Xavier),
            "he" => Ok(Initializer::He),
            _ => Err(format!("Unrecognized initializer: {:?}", s)),
        }
    }
}
