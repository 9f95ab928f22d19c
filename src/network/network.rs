use log::info;

use crate::{
    cost::cost_function::CostFunction,
    data::dataset::{Dataset, SplitKind},
    error::{Error, Result},
    layers::dense::Layer,
    math::{matrix::Matrix, random::RandomSource},
    network::checkpoint::Checkpoint,
    network::evaluate::{classify, evaluate_split, Evaluation},
    train::{epoch_stats::EpochStats, loop_fn::train_loop, train_config::TrainConfig},
};

/// A fully connected feed-forward network trained against a borrowed dataset.
///
/// The network owns its layers but never builds them; callers construct the
/// layers, hand them over, and can inspect or take them back afterwards.
pub struct Network<'a, D: Dataset> {
    pub(crate) layers: Vec<Layer>,
    pub(crate) dataset: &'a mut D,
    pub(crate) epochs_completed: usize,
}

impl<'a, D: Dataset> Network<'a, D> {
    /// Wires `layers` to `dataset` after checking that they fit together:
    /// adjacent layers must chain, the first layer must take the dataset's
    /// inputs and the last must produce its outputs.
    pub fn new(dataset: &'a mut D, layers: Vec<Layer>) -> Result<Network<'a, D>> {
        let (first, last) = match (layers.first(), layers.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::EmptyNetwork),
        };
        if first.n_inputs != dataset.n_inputs() {
            return Err(Error::InputMismatch { layer: first.n_inputs, dataset: dataset.n_inputs() });
        }
        if last.n_outputs != dataset.n_outputs() {
            return Err(Error::OutputMismatch { layer: last.n_outputs, dataset: dataset.n_outputs() });
        }
        for (index, pair) in layers.windows(2).enumerate() {
            if pair[0].n_outputs != pair[1].n_inputs {
                return Err(Error::LayerMismatch {
                    index: index + 1,
                    expected: pair[1].n_inputs,
                    found: pair[0].n_outputs,
                });
            }
        }

        info!("Created fully connected artificial neural network:");
        for layer in &layers {
            info!("- {} inputs, {} outputs, {}", layer.n_inputs, layer.n_outputs, layer.activator);
        }

        Ok(Network { layers, dataset, epochs_completed: 0 })
    }

    /// Rebuilds a network from a checkpoint, continuing its epoch count.
    pub fn from_checkpoint(dataset: &'a mut D, checkpoint: Checkpoint) -> Result<Network<'a, D>> {
        let mut network = Network::new(dataset, checkpoint.layers)?;
        network.resume_from(checkpoint.epochs_completed);
        Ok(network)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn into_layers(self) -> Vec<Layer> {
        self.layers
    }

    /// Epochs trained so far, summed over every `train` call.
    pub fn epochs_completed(&self) -> usize {
        self.epochs_completed
    }

    /// Sets the epoch count so the next `train` call numbers its epochs from
    /// `epochs + 1`.
    pub fn resume_from(&mut self, epochs: usize) {
        self.epochs_completed = epochs;
    }

    /// Snapshot of the layers and epoch count for resuming later.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint { epochs_completed: self.epochs_completed, layers: self.layers.clone() }
    }

    /// Forward pass; stores intermediates in each layer for backprop.
    pub fn forward(&mut self, input: &Matrix) -> Matrix {
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current);
        }
        current
    }

    /// Forward pass that leaves the layers untouched.
    pub fn predict(&self, input: &Matrix) -> Matrix {
        predict_with(&self.layers, input)
    }

    /// Runs `config.epochs` epochs of mini-batch SGD. Returns one record per
    /// epoch.
    pub fn train(&mut self, config: &TrainConfig, rng: &mut RandomSource) -> Result<Vec<EpochStats>> {
        train_loop(self, config, rng)
    }

    /// Accuracy, mean cost and misclassified examples over one split.
    pub fn evaluate(&self, split: SplitKind, cost: CostFunction) -> Evaluation {
        evaluate_split(&self.layers, self.dataset.split(split), self.dataset.n_outputs(), cost)
    }

    /// Renders up to `n` randomly chosen misclassified examples of `split`.
    ///
    /// Each entry is the dataset's rendering of the input and its true label,
    /// followed by the network's prediction. Labels are shown through
    /// `label_names` when it covers the class, otherwise as raw indices.
    pub fn report_misclassified(
        &self,
        split: SplitKind,
        n: usize,
        label_names: Option<&[String]>,
        rng: &mut RandomSource,
    ) -> Vec<String> {
        let data = self.dataset.split(split);
        let predictions = classify(&self.layers, data);
        let mut wrong: Vec<usize> = predictions
            .iter()
            .enumerate()
            .filter(|&(i, &p)| p != data.labels.class_of(i))
            .map(|(i, _)| i)
            .collect();
        rng.shuffle(&mut wrong);

        let name = |class: usize| match label_names.and_then(|names| names.get(class)) {
            Some(label) => label.clone(),
            None => class.to_string(),
        };

        wrong
            .into_iter()
            .take(n)
            .map(|i| {
                let mut shown = self.dataset.display(&data.example(i), &name(data.labels.class_of(i)));
                shown.push_str(&format!("Prediction: {}\n", name(predictions[i])));
                shown
            })
            .collect()
    }
}

pub(crate) fn predict_with(layers: &[Layer], input: &Matrix) -> Matrix {
    let mut current = input.clone();
    for layer in layers {
        current = layer.infer(&current);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::data::{labels::Labels, dataset::Split, memory::{Layout, MemoryDataset}};

    fn dataset() -> MemoryDataset {
        let inputs = Matrix::from_data(vec![
            vec![0.0, 0.0, 1.0, 1.0],
            vec![0.0, 1.0, 0.0, 1.0],
        ]);
        let training = Split::new(inputs.clone(), Labels::Index(vec![0, 1, 1, 0])).unwrap();
        let test = Split::new(inputs, Labels::Index(vec![0, 1, 1, 0])).unwrap();
        MemoryDataset::new(training, Split::empty(2), test, 2, Layout::Tabular).unwrap()
    }

    #[test]
    fn construction_checks_the_architecture() {
        let mut data = dataset();
        let mut rng = RandomSource::seeded(1);
        let sig = ActivationFunction::Sigmoid;

        assert!(matches!(Network::new(&mut data, vec![]), Err(Error::EmptyNetwork)));
        assert!(matches!(
            Network::new(&mut data, vec![Layer::new(3, 2, sig, &mut rng)]),
            Err(Error::InputMismatch { layer: 3, dataset: 2 })
        ));
        assert!(matches!(
            Network::new(&mut data, vec![Layer::new(2, 3, sig, &mut rng)]),
            Err(Error::OutputMismatch { layer: 3, dataset: 2 })
        ));
        assert!(matches!(
            Network::new(&mut data, vec![Layer::new(2, 4, sig, &mut rng), Layer::new(5, 2, sig, &mut rng)]),
            Err(Error::LayerMismatch { index: 1, expected: 5, found: 4 })
        ));
        assert!(Network::new(&mut data, vec![Layer::new(2, 4, sig, &mut rng), Layer::new(4, 2, sig, &mut rng)]).is_ok());
    }

    #[test]
    fn forward_and_predict_agree() {
        let mut data = dataset();
        let mut rng = RandomSource::seeded(4);
        let layers = vec![
            Layer::new(2, 3, ActivationFunction::Tanh, &mut rng),
            Layer::new(3, 2, ActivationFunction::Sigmoid, &mut rng),
        ];
        let mut net = Network::new(&mut data, layers).unwrap();
        let input = rng.normal_matrix(2, 6);
        let predicted = net.predict(&input);
        assert_eq!(net.forward(&input), predicted);
        assert_eq!(predicted.shape(), (2, 6));
    }

    /// A layer whose output always favours `class`.
    fn constant_layer(class: usize) -> Layer {
        let mut biases = vec![-5.0, -5.0];
        biases[class] = 5.0;
        Layer::with_parameters(Matrix::zeros(2, 2), biases, ActivationFunction::Sigmoid)
    }

    #[test]
    fn report_lists_only_misclassified_examples() {
        let mut data = dataset();
        let net = Network::new(&mut data, vec![constant_layer(0)]).unwrap();
        let names = vec!["even".to_string(), "odd".to_string()];
        let mut rng = RandomSource::seeded(8);

        let shown = net.report_misclassified(SplitKind::Test, 10, Some(names.as_slice()), &mut rng);
        assert_eq!(shown.len(), 2);
        for entry in &shown {
            assert!(entry.contains("Label: odd"), "{entry}");
            assert!(entry.ends_with("Prediction: even\n"), "{entry}");
        }

        let limited = net.report_misclassified(SplitKind::Test, 1, None, &mut rng);
        assert_eq!(limited.len(), 1);
        assert!(limited[0].contains("Label: 1"));
        assert!(limited[0].contains("Prediction: 0"));
    }

    #[test]
    fn checkpoint_keeps_epoch_count() {
        let mut data = dataset();
        let mut net = Network::new(&mut data, vec![constant_layer(1)]).unwrap();
        net.resume_from(7);
        let cp = net.checkpoint();
        drop(net);
        let restored = Network::from_checkpoint(&mut data, cp).unwrap();
        assert_eq!(restored.epochs_completed(), 7);
        assert_eq!(restored.layers()[0].biases, vec![-5.0, 5.0]);
    }
}
