use thiserror::Error;

/// Errors surfaced by network construction, training setup and data I/O.
///
/// Numerical edge cases inside the cost functions are never errors; see
/// `cost::cross_entropy`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("network has no layers")]
    EmptyNetwork,

    #[error("layer {index} expects {expected} inputs but the previous layer produces {found}")]
    LayerMismatch { index: usize, expected: usize, found: usize },

    #[error("first layer expects {layer} inputs but the dataset provides {dataset}")]
    InputMismatch { layer: usize, dataset: usize },

    #[error("last layer produces {layer} outputs but the dataset has {dataset}")]
    OutputMismatch { layer: usize, dataset: usize },

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("malformed input: {0}")]
    Format(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
