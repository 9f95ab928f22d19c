pub mod dense;
pub mod init;

pub use dense::{Gradients, Layer};
pub use init::Initializer;
