pub mod math;
pub mod activation;
pub mod layers;
pub mod optim;
pub mod cost;
pub mod data;
pub mod network;
pub mod train;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use math::random::RandomSource;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use layers::init::Initializer;
pub use optim::sgd::{Sgd, UpdatePolicy};
pub use cost::cost_function::CostFunction;
pub use data::{Dataset, Labels, Layout, MemoryDataset, RemainderPolicy, Split, SplitKind};
pub use network::{Checkpoint, Evaluation, Misclassified, Network};
pub use train::{EpochStats, TrainConfig};
pub use error::{Error, Result};
