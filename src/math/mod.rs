pub mod matrix;
pub mod random;

pub use matrix::Matrix;
pub use random::RandomSource;
