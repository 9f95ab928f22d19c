use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layers::dense::Layer;

/// Trained parameters plus the number of epochs that produced them.
///
/// Only weights, biases and activations are stored; backprop caches and
/// pending accumulators are not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epochs_completed: usize,
    pub layers: Vec<Layer>,
}

impl Checkpoint {
    /// Writes the checkpoint as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("Saved checkpoint after {} epochs to {:?}", self.epochs_completed, path);
        Ok(())
    }

    /// Reads a checkpoint written by `save_json`, rejecting layers whose
    /// parameter shapes disagree with their declared sizes.
    pub fn load_json(path: &Path) -> Result<Checkpoint> {
        let reader = BufReader::new(File::open(path)?);
        let checkpoint: Checkpoint = serde_json::from_reader(reader)?;
        if let Some(index) = checkpoint.layers.iter().position(|l| !l.is_consistent()) {
            return Err(Error::Format(format!(
                "{}: layer {} has parameters that do not match its declared shape",
                path.display(),
                index
            )));
        }
        info!("Loaded checkpoint from {:?} ({} epochs, {} layers)", path, checkpoint.epochs_completed, checkpoint.layers.len());
        Ok(checkpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::math::random::RandomSource;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mlp-trainer-checkpoint-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn save_then_load_keeps_parameters() {
        let mut rng = RandomSource::seeded(21);
        let checkpoint = Checkpoint {
            epochs_completed: 12,
            layers: vec![
                Layer::new(3, 4, ActivationFunction::ReLU, &mut rng),
                Layer::new(4, 2, ActivationFunction::Sigmoid, &mut rng),
            ],
        };
        let path = scratch("roundtrip");
        checkpoint.save_json(&path).unwrap();
        let loaded = Checkpoint::load_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.epochs_completed, 12);
        assert_eq!(loaded.layers.len(), 2);
        for (a, b) in loaded.layers.iter().zip(&checkpoint.layers) {
            assert_eq!(a.weights, b.weights);
            assert_eq!(a.biases, b.biases);
            assert_eq!(a.activator, b.activator);
        }
    }

    #[test]
    fn inconsistent_layer_is_rejected() {
        let path = scratch("inconsistent");
        let json = r#"{"epochs_completed":1,"layers":[{"n_inputs":2,"n_outputs":1,
            "weights":{"rows":1,"cols":1,"data":[[0.5]]},"biases":[0.0],"activator":"sigmoid"}]}"#;
        std::fs::write(&path, json).unwrap();
        let result = Checkpoint::load_json(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(Checkpoint::load_json(&scratch("missing")), Err(Error::Io(_))));
    }
}
