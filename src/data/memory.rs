use log::info;

use crate::data::dataset::{Dataset, Split};
use crate::data::labels::Labels;
use crate::error::{Error, Result};
use crate::math::random::RandomSource;

/// How examples are rendered by `Dataset::display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// A plain feature vector.
    Tabular,
    /// A grayscale image with pixel values in [0, 1], stored row-major.
    Image { width: usize, height: usize },
}

/// A dataset held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryDataset {
    n_inputs: usize,
    n_outputs: usize,
    training: Split,
    validation: Split,
    test: Split,
    layout: Layout,
}

impl MemoryDataset {
    /// Validates and assembles a dataset from its three splits.
    ///
    /// `n_inputs` is taken from the training split; every non-empty split must
    /// agree with it, and every label must name a class below `n_outputs`.
    pub fn new(
        training: Split,
        validation: Split,
        test: Split,
        n_outputs: usize,
        layout: Layout,
    ) -> Result<MemoryDataset> {
        let n_inputs = training.inputs.rows;
        if training.is_empty() {
            return Err(Error::InvalidDataset("training split is empty".into()));
        }
        if n_inputs == 0 || n_outputs == 0 {
            return Err(Error::InvalidDataset(format!(
                "dataset must have at least one input and one output, got {} and {}",
                n_inputs, n_outputs
            )));
        }
        if let Layout::Image { width, height } = layout {
            if width * height != n_inputs {
                return Err(Error::InvalidDataset(format!(
                    "image layout {}×{} does not match {} inputs",
                    width, height, n_inputs
                )));
            }
        }

        for (name, split) in [("training", &training), ("validation", &validation), ("test", &test)] {
            if split.is_empty() {
                continue;
            }
            if split.inputs.rows != n_inputs {
                return Err(Error::InvalidDataset(format!(
                    "{} split has {} features, expected {}",
                    name, split.inputs.rows, n_inputs
                )));
            }
            match &split.labels {
                Labels::OneHot(m) if m.rows != n_outputs => {
                    return Err(Error::InvalidDataset(format!(
                        "{} split has {}-wide one-hot labels, expected {}",
                        name, m.rows, n_outputs
                    )));
                }
                Labels::Index(v) if v.iter().any(|&c| c >= n_outputs) => {
                    return Err(Error::InvalidDataset(format!(
                        "{} split has a class index outside 0..{}",
                        name, n_outputs
                    )));
                }
                _ => {}
            }
        }

        info!("- {} inputs, {} outputs", n_inputs, n_outputs);
        info!("- {} training data sets", training.len());
        info!("- {} validation data sets", validation.len());
        info!("- {} test data sets", test.len());

        Ok(MemoryDataset { n_inputs, n_outputs, training, validation, test, layout })
    }
}

impl Dataset for MemoryDataset {
    fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    fn training(&self) -> &Split {
        &self.training
    }

    fn validation(&self) -> &Split {
        &self.validation
    }

    fn test(&self) -> &Split {
        &self.test
    }

    fn shuffle_training(&mut self, rng: &mut RandomSource) {
        let permutation = rng.permutation(self.training.len());
        self.training.permute(&permutation);
    }

    fn display(&self, input: &[f64], label: &str) -> String {
        match self.layout {
            Layout::Tabular => {
                let features: Vec<String> = input.iter().map(|x| format!("{:.3}", x)).collect();
                format!("Input: [{}]\nLabel: {}\n", features.join(", "), label)
            }
            Layout::Image { width, .. } => {
                let mut out = String::from("Image:\n");
                for row in input.chunks(width.max(1)) {
                    out.extend(row.iter().map(|&v| shade(v)));
                    out.push('\n');
                }
                out.push_str(&format!("Label: {}\n", label));
                out
            }
        }
    }
}

/// Maps an intensity in [0, 1] onto four block glyphs, light to dark.
fn shade(v: f64) -> char {
    match (4.0 * v - 0.01).trunc().clamp(0.0, 3.0) as u8 {
        0 => '░',
        1 => '▒',
        2 => '▓',
        _ => '█',
    }
}
