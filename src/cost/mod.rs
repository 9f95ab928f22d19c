pub mod mse;
pub mod cross_entropy;
pub mod cost_function;

pub use mse::MeanSquaredError;
pub use cross_entropy::CrossEntropy;
pub use cost_function::CostFunction;
