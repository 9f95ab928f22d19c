pub mod network;
pub mod evaluate;
pub mod checkpoint;

pub use network::Network;
pub use evaluate::{Evaluation, Misclassified};
pub use checkpoint::Checkpoint;
