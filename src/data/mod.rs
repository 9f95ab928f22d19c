pub mod dataset;
pub mod labels;
pub mod memory;
pub mod csv;
pub mod idx;

pub use dataset::{Batch, Dataset, RemainderPolicy, Split, SplitKind};
pub use labels::Labels;
pub use memory::{Layout, MemoryDataset};

use crate::error::{Error, Result};

/// Cuts a full training file into (training, validation): the first
/// `training` examples and the last `validation` examples. With `None`, all
/// examples not reserved for validation are used for training.
pub(crate) fn partition_training(full: &Split, training: Option<usize>, validation: usize) -> Result<(Split, Split)> {
    let n = full.len();
    if validation > n {
        return Err(Error::InvalidDataset(format!(
            "asked for {} validation examples but only {} are available",
            validation, n
        )));
    }
    let training = training.unwrap_or(n - validation);
    if training + validation > n {
        return Err(Error::InvalidDataset(format!(
            "asked for {} training + {} validation examples but only {} are available",
            training, validation, n
        )));
    }
    Ok((full.range(0, training), full.range(n - validation, n)))
}
