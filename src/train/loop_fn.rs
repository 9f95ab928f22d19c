use std::time::Instant;

use log::{debug, info, trace, warn};

use crate::data::dataset::{Dataset, RemainderPolicy, SplitKind};
use crate::error::Result;
use crate::math::random::RandomSource;
use crate::network::network::Network;
use crate::optim::sgd::{Sgd, UpdatePolicy};
use crate::train::epoch_stats::EpochStats;
use crate::train::history::HistoryWriter;
use crate::train::train_config::TrainConfig;

/// Trains `network` for `config.epochs` epochs of mini-batch SGD and returns
/// one `EpochStats` per completed epoch.
///
/// The configuration is validated and the history file (if any) opened before
/// the first epoch, so a bad setting never leaves a half-trained network.
/// Epoch numbers continue from `network.epochs_completed()`.
pub fn train_loop<D: Dataset>(
    network: &mut Network<'_, D>,
    config: &TrainConfig,
    rng: &mut RandomSource,
) -> Result<Vec<EpochStats>> {
    let training_size = network.dataset.training_size();
    config.validate(training_size)?;
    let mut history = config.history.as_deref().map(HistoryWriter::open).transpose()?;

    let optimizer = Sgd::new(config.learning_rate).with_weight_decay(config.lambda, training_size);
    debug!(
        "Training: {} epochs, batch size {}, learning rate {}, cost {}, lambda {}, {} updates, {} remainder",
        config.epochs,
        config.batch_size,
        config.learning_rate,
        config.cost,
        config.lambda,
        config.update_policy,
        config.remainder
    );

    let remainder = training_size % config.batch_size;
    if config.remainder == RemainderPolicy::Drop && remainder > 0 {
        warn!("Dropping the last {} training examples of every epoch (batch size {})", remainder, config.batch_size);
    }

    let first_epoch = network.epochs_completed + 1;
    let last_epoch = network.epochs_completed + config.epochs;
    let mut records = Vec::with_capacity(config.epochs);

    for epoch in first_epoch..=last_epoch {
        let started = Instant::now();
        let (train_accuracy, train_cost) = run_one_epoch(network, config, &optimizer, rng);

        let mut stats = EpochStats {
            epoch,
            total_epochs: last_epoch,
            train_accuracy,
            train_cost,
            validation_accuracy: None,
            validation_cost: None,
            test_accuracy: None,
            test_cost: None,
            elapsed_ms: 0,
        };
        if config.evaluate_validation {
            let eval = network.evaluate(SplitKind::Validation, config.cost);
            stats.validation_accuracy = Some(eval.accuracy);
            stats.validation_cost = Some(eval.mean_cost);
        }
        if config.evaluate_test {
            let eval = network.evaluate(SplitKind::Test, config.cost);
            stats.test_accuracy = Some(eval.accuracy);
            stats.test_cost = Some(eval.mean_cost);
        }
        network.epochs_completed = epoch;
        stats.elapsed_ms = started.elapsed().as_millis() as u64;

        info!("{} ({} ms)", stats, stats.elapsed_ms);
        if let Some(history) = history.as_mut() {
            history.record(&stats)?;
        }
        records.push(stats);
    }

    Ok(records)
}

/// One pass over the shuffled training split. Returns (accuracy, mean cost),
/// both divided by the training split size even when `Drop` skips the tail.
fn run_one_epoch<D: Dataset>(
    network: &mut Network<'_, D>,
    config: &TrainConfig,
    optimizer: &Sgd,
    rng: &mut RandomSource,
) -> (f64, f64) {
    network.dataset.shuffle_training(rng);
    let batches = network.dataset.training_batches(config.batch_size, config.remainder);
    debug!("{} batches this epoch", batches.len());

    let training_size = network.dataset.training_size();
    let mut correct = 0;
    let mut cost_sum = 0.0;

    for (b, batch) in batches.iter().enumerate() {
        let output = network.forward(&batch.inputs);

        correct += (0..output.cols)
            .filter(|&j| output.argmax_column(j) == batch.targets.argmax_column(j))
            .count();
        let batch_cost = config.cost.eval(&output, &batch.targets);
        cost_sum += batch_cost;
        trace!("batch {}: {} examples, cost {}", b, output.cols, batch_cost);

        let mut grad = config.cost.deriv(&output, &batch.targets);
        for layer in network.layers.iter_mut().rev() {
            grad = layer.backward(&grad, optimizer, config.update_policy);
        }
        if config.update_policy == UpdatePolicy::Accumulate {
            for layer in network.layers.iter_mut() {
                layer.flush(optimizer);
            }
        }
    }

    if training_size == 0 {
        return (0.0, 0.0);
    }
    (correct as f64 / training_size as f64, cost_sum / training_size as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::cost::cost_function::CostFunction;
    use crate::data::{dataset::Split, labels::Labels, memory::{Layout, MemoryDataset}};
    use crate::error::Error;
    use crate::layers::dense::Layer;
    use crate::math::matrix::Matrix;
    use approx::assert_relative_eq;

    fn five_points() -> MemoryDataset {
        let inputs = Matrix::from_data(vec![vec![0.0, 1.0, 0.0, 1.0, 0.5]]);
        let training = Split::new(inputs.clone(), Labels::Index(vec![0, 1, 0, 1, 1])).unwrap();
        let test = Split::new(inputs, Labels::Index(vec![0, 1, 0, 1, 1])).unwrap();
        MemoryDataset::new(training, Split::empty(1), test, 2, Layout::Tabular).unwrap()
    }

    fn layers(seed: u64) -> Vec<Layer> {
        let mut rng = RandomSource::seeded(seed);
        vec![Layer::new(1, 2, ActivationFunction::Sigmoid, &mut rng)]
    }

    #[test]
    fn returns_one_record_per_epoch_with_requested_evaluations() {
        let mut data = five_points();
        let mut net = Network::new(&mut data, layers(1)).unwrap();
        let config = TrainConfig::new(0.5, 3, 2, CostFunction::CrossEntropy).with_test(true);
        let stats = net.train(&config, &mut RandomSource::seeded(2)).unwrap();

        assert_eq!(stats.iter().map(|s| s.epoch).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(stats.iter().all(|s| s.test_accuracy.is_some() && s.validation_accuracy.is_none()));
        assert!(stats.iter().all(|s| (0.0..=1.0).contains(&s.train_accuracy)));
        assert_eq!(net.epochs_completed(), 3);
    }

    #[test]
    fn epoch_numbers_continue_across_calls() {
        let mut data = five_points();
        let mut net = Network::new(&mut data, layers(1)).unwrap();
        let config = TrainConfig::new(0.5, 2, 5, CostFunction::MeanSquaredError);
        let mut rng = RandomSource::seeded(3);
        net.train(&config, &mut rng).unwrap();
        let second = net.train(&config, &mut rng).unwrap();
        assert_eq!((second[0].epoch, second[1].epoch, second[1].total_epochs), (3, 4, 4));
    }

    #[test]
    fn invalid_config_leaves_the_network_untouched() {
        let mut data = five_points();
        let mut net = Network::new(&mut data, layers(4)).unwrap();
        let before = net.layers()[0].weights.clone();
        let config = TrainConfig::new(0.5, 1, 8, CostFunction::MeanSquaredError).with_remainder(RemainderPolicy::Drop);
        assert!(matches!(net.train(&config, &mut RandomSource::seeded(1)), Err(Error::InvalidConfig(_))));
        assert_eq!(net.layers()[0].weights, before);
        assert_eq!(net.epochs_completed(), 0);
    }

    #[test]
    fn epoch_times_fit_inside_the_whole_run() {
        let mut data = five_points();
        let mut net = Network::new(&mut data, layers(2)).unwrap();
        let config = TrainConfig::new(0.5, 4, 2, CostFunction::CrossEntropy).with_test(true);
        let started = Instant::now();
        let stats = net.train(&config, &mut RandomSource::seeded(7)).unwrap();
        let total_ms = started.elapsed().as_millis() as u64;

        assert_eq!(stats.len(), 4);
        assert!(stats.iter().map(|s| s.elapsed_ms).sum::<u64>() <= total_ms);
    }

    #[test]
    fn statistics_divide_by_the_training_size_when_dropping() {
        let inputs = Matrix::from_data(vec![vec![0.0, 1.0, 2.0, 3.0, 4.0]]);
        let training = Split::new(inputs, Labels::Index(vec![0; 5])).unwrap();
        let mut data = MemoryDataset::new(training, Split::empty(1), Split::empty(1), 2, Layout::Tabular).unwrap();
        // Both outputs sit at 0.5 so every example costs 0.25 and argmax is class 0.
        let layer = Layer::with_parameters(Matrix::zeros(2, 1), vec![0.0, 0.0], ActivationFunction::Sigmoid);
        let mut net = Network::new(&mut data, vec![layer]).unwrap();
        let config = TrainConfig::new(1e-12, 1, 2, CostFunction::MeanSquaredError)
            .with_remainder(RemainderPolicy::Drop);
        let stats = net.train(&config, &mut RandomSource::seeded(1)).unwrap();

        assert_relative_eq!(stats[0].train_cost, 4.0 * 0.25 / 5.0, epsilon = 1e-9);
        assert_relative_eq!(stats[0].train_accuracy, 4.0 / 5.0);
    }

    #[test]
    fn accumulate_matches_immediate() {
        let run = |policy: UpdatePolicy| {
            let mut data = five_points();
            let mut net = Network::new(&mut data, layers(9)).unwrap();
            let config = TrainConfig::new(1.0, 4, 2, CostFunction::CrossEntropy).with_update_policy(policy);
            let stats = net.train(&config, &mut RandomSource::seeded(5)).unwrap();
            (net.into_layers(), stats)
        };
        let (immediate, immediate_stats) = run(UpdatePolicy::Immediate);
        let (accumulate, accumulate_stats) = run(UpdatePolicy::Accumulate);
        assert_eq!(immediate[0].weights, accumulate[0].weights);
        assert_eq!(immediate[0].biases, accumulate[0].biases);
        let summary = |stats: &[EpochStats]| -> Vec<(usize, f64, f64)> {
            stats.iter().map(|s| (s.epoch, s.train_accuracy, s.train_cost)).collect()
        };
        assert_eq!(summary(&immediate_stats), summary(&accumulate_stats));
    }
}
