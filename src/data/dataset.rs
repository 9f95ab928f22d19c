use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::data::labels::Labels;
use crate::error::{Error, Result};
use crate::math::{matrix::Matrix, random::RandomSource};

/// What to do with the final undersized batch when the training set size is
/// not a multiple of the batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Train on the leftover examples as one smaller batch.
    #[default]
    Include,
    /// Skip the leftover examples for this epoch.
    Drop,
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RemainderPolicy::Include => "include",
            RemainderPolicy::Drop => "drop",
        })
    }
}

impl FromStr for RemainderPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "include" => Ok(RemainderPolicy::Include),
            "drop" => Ok(RemainderPolicy::Drop),
            _ => Err(format!("Unrecognized remainder policy: {:?}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitKind {
    Training,
    Validation,
    Test,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitKind::Training => "training",
            SplitKind::Validation => "validation",
            SplitKind::Test => "test",
        })
    }
}

/// Column-aligned inputs and labels: column `j` of `inputs` is labelled by
/// `labels.class_of(j)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub inputs: Matrix,
    pub labels: Labels,
}

/// One mini-batch; `targets` is always one-hot.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub inputs: Matrix,
    pub targets: Matrix,
}

impl Split {
    pub fn new(inputs: Matrix, labels: Labels) -> Result<Split> {
        if inputs.cols != labels.len() {
            return Err(Error::InvalidDataset(format!(
                "split has {} examples but {} labels",
                inputs.cols,
                labels.len()
            )));
        }
        Ok(Split { inputs, labels })
    }

    /// A split with no examples.
    pub fn empty(n_inputs: usize) -> Split {
        Split { inputs: Matrix::zeros(n_inputs, 0), labels: Labels::Index(Vec::new()) }
    }

    pub fn len(&self) -> usize {
        self.inputs.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn example(&self, i: usize) -> Vec<f64> {
        self.inputs.column(i)
    }

    /// Examples `start..end` as a new split.
    pub fn range(&self, start: usize, end: usize) -> Split {
        Split {
            inputs: self.inputs.column_range(start, end),
            labels: self.labels.range(start, end),
        }
    }

    pub fn permute(&mut self, permutation: &[usize]) {
        self.inputs.permute_columns(permutation);
        self.labels.permute(permutation);
    }

    /// Partitions the split into contiguous batches of `batch_size` columns.
    ///
    /// # Panics
    /// Panics if `batch_size == 0`.
    pub fn batches(&self, batch_size: usize, policy: RemainderPolicy, n_classes: usize) -> Vec<Batch> {
        assert!(batch_size > 0, "batch_size must be at least 1");
        let n = self.len();
        let end = match policy {
            RemainderPolicy::Include => n,
            RemainderPolicy::Drop => n - n % batch_size,
        };
        let targets = self.labels.to_one_hot(n_classes);

        (0..end)
            .step_by(batch_size)
            .map(|start| {
                let stop = (start + batch_size).min(end);
                Batch {
                    inputs: self.inputs.column_range(start, stop),
                    targets: targets.column_range(start, stop),
                }
            })
            .collect()
    }
}

/// The capability the training core needs from a dataset.
pub trait Dataset {
    fn n_inputs(&self) -> usize;
    fn n_outputs(&self) -> usize;

    fn training(&self) -> &Split;
    fn validation(&self) -> &Split;
    fn test(&self) -> &Split;

    /// Randomly permutes the training examples in place. Validation and test
    /// splits are left untouched.
    fn shuffle_training(&mut self, rng: &mut RandomSource);

    /// Renders one example for a human, e.g. as terminal glyphs.
    fn display(&self, input: &[f64], label: &str) -> String;

    fn training_size(&self) -> usize {
        self.training().len()
    }

    fn validation_size(&self) -> usize {
        self.validation().len()
    }

    fn test_size(&self) -> usize {
        self.test().len()
    }

    fn split(&self, kind: SplitKind) -> &Split {
        match kind {
            SplitKind::Training => self.training(),
            SplitKind::Validation => self.validation(),
            SplitKind::Test => self.test(),
        }
    }

    fn training_batches(&self, batch_size: usize, policy: RemainderPolicy) -> Vec<Batch> {
        self.training().batches(batch_size, policy, self.n_outputs())
    }
}
