use std::path::PathBuf;

use approx::assert_relative_eq;
use mlp_trainer::{
    ActivationFunction, Checkpoint, CostFunction, Error, Labels, Layer, Layout, Matrix, MemoryDataset, Network,
    RandomSource, RemainderPolicy, Split, SplitKind, TrainConfig, UpdatePolicy,
};

fn xor_split(copies: usize) -> Split {
    let mut columns = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..copies {
        for (a, b) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            columns.push(vec![a as f64, b as f64]);
            labels.push(a ^ b);
        }
    }
    Split::new(Matrix::from_columns(&columns), Labels::Index(labels)).unwrap()
}

fn xor_dataset(copies: usize) -> MemoryDataset {
    let training = xor_split(copies);
    let one_hot = Labels::OneHot(training.labels.to_one_hot(2));
    let training = Split::new(training.inputs, one_hot).unwrap();
    MemoryDataset::new(training, xor_split(1), xor_split(1), 2, Layout::Tabular).unwrap()
}

fn xor_layers(seed: u64) -> Vec<Layer> {
    let mut rng = RandomSource::seeded(seed);
    vec![
        Layer::new(2, 4, ActivationFunction::Sigmoid, &mut rng),
        Layer::new(4, 2, ActivationFunction::Sigmoid, &mut rng),
    ]
}

fn weight_norm(layers: &[Layer]) -> f64 {
    layers.iter().map(|l| l.weights.frobenius_norm().powi(2)).sum::<f64>().sqrt()
}

fn scratch(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("mlp-trainer-it-{}-{}", name, std::process::id()));
    std::fs::remove_file(&path).ok();
    path
}

#[test]
fn xor_is_learned() {
    let mut data = xor_dataset(25);
    let mut net = Network::new(&mut data, xor_layers(3)).unwrap();
    let config = TrainConfig::new(1.0, 200, 2, CostFunction::CrossEntropy).with_test(true);
    let stats = net.train(&config, &mut RandomSource::seeded(11)).unwrap();

    let last = stats.last().unwrap();
    assert_eq!(stats.len(), 200);
    assert!(last.train_accuracy >= 0.75, "training accuracy {}", last.train_accuracy);
    assert!(net.evaluate(SplitKind::Training, CostFunction::CrossEntropy).accuracy >= 0.75);
    assert!(last.train_cost < stats[0].train_cost);
}

#[test]
fn xor_is_learned_from_the_four_points() {
    let converged = (0..6u64)
        .filter(|&seed| {
            let mut data = MemoryDataset::new(xor_split(1), xor_split(1), xor_split(1), 2, Layout::Tabular).unwrap();
            let mut net = Network::new(&mut data, xor_layers(seed)).unwrap();
            let config = TrainConfig::new(1.0, 300, 1, CostFunction::CrossEntropy);
            net.train(&config, &mut RandomSource::seeded(seed + 100)).unwrap();
            net.evaluate(SplitKind::Training, CostFunction::CrossEntropy).accuracy >= 0.75
        })
        .count();
    // Plain SGD on XOR occasionally settles in a local minimum.
    assert!(converged >= 5, "only {converged} of 6 initializations reached 75% accuracy");
}

#[test]
fn weight_decay_shrinks_the_weights() {
    let train = |lambda: f64| {
        let mut data = xor_dataset(25);
        let mut net = Network::new(&mut data, xor_layers(5)).unwrap();
        let config = TrainConfig::new(1.0, 20, 2, CostFunction::CrossEntropy).with_lambda(lambda);
        net.train(&config, &mut RandomSource::seeded(6)).unwrap();
        weight_norm(net.layers())
    };
    let plain = train(0.0);
    let decayed = train(5.0);
    assert!(decayed < plain, "{decayed} >= {plain}");
}

#[test]
fn update_policies_agree_on_a_deep_network() {
    let train = |policy: UpdatePolicy| {
        let mut data = xor_dataset(5);
        let mut net = Network::new(&mut data, xor_layers(8)).unwrap();
        let config = TrainConfig::new(0.8, 6, 3, CostFunction::MeanSquaredError)
            .with_lambda(0.5)
            .with_update_policy(policy);
        net.train(&config, &mut RandomSource::seeded(2)).unwrap();
        net.into_layers()
    };
    let immediate = train(UpdatePolicy::Immediate);
    let accumulate = train(UpdatePolicy::Accumulate);
    for (a, b) in immediate.iter().zip(&accumulate) {
        for (x, y) in a.weights.data.iter().flatten().zip(b.weights.data.iter().flatten()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }
        for (x, y) in a.biases.iter().zip(&b.biases) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }
    }
}

#[test]
fn history_file_gets_a_header_and_a_row_per_epoch() {
    let path = scratch("history.csv");
    let mut data = xor_dataset(3);
    let mut net = Network::new(&mut data, xor_layers(1)).unwrap();
    let config = TrainConfig::new(0.5, 3, 4, CostFunction::CrossEntropy)
        .with_validation(true)
        .with_history(&path);
    let mut rng = RandomSource::seeded(1);
    net.train(&config, &mut rng).unwrap();
    net.train(&TrainConfig { epochs: 2, ..config.clone() }, &mut rng).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header[0], "epoch");
    assert_eq!(header.len(), 7);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    std::fs::remove_file(&path).ok();

    assert_eq!(rows.len(), 5);
    let epochs: Vec<&str> = rows.iter().map(|r| &r[0]).collect();
    assert_eq!(epochs, vec!["1", "2", "3", "4", "5"]);
    assert!(!rows[0][3].is_empty());
    assert!(rows[0][5].is_empty());
}

#[test]
fn unwritable_history_fails_before_training() {
    let mut data = xor_dataset(2);
    let mut net = Network::new(&mut data, xor_layers(1)).unwrap();
    let before = net.layers()[0].weights.clone();
    let missing_dir = std::env::temp_dir().join("mlp-trainer-no-such-dir").join("history.csv");
    let config = TrainConfig::new(0.5, 1, 2, CostFunction::CrossEntropy).with_history(missing_dir);
    assert!(matches!(net.train(&config, &mut RandomSource::seeded(1)), Err(Error::Io(_))));
    assert_eq!(net.layers()[0].weights, before);
}

#[test]
fn configuration_errors_are_reported() {
    let mut data = xor_dataset(2);
    let mut net = Network::new(&mut data, xor_layers(1)).unwrap();
    let mut rng = RandomSource::seeded(1);
    let base = TrainConfig::new(0.5, 1, 2, CostFunction::CrossEntropy);

    for config in [
        TrainConfig { epochs: 0, ..base.clone() },
        TrainConfig { batch_size: 0, ..base.clone() },
        TrainConfig { learning_rate: -1.0, ..base.clone() },
        base.clone().with_lambda(-0.1),
        TrainConfig { batch_size: 9, ..base.clone() }.with_remainder(RemainderPolicy::Drop),
    ] {
        assert!(matches!(net.train(&config, &mut rng), Err(Error::InvalidConfig(_))), "{config:?}");
    }
    assert_eq!(net.epochs_completed(), 0);
}

#[test]
fn training_resumes_from_a_checkpoint() {
    let path = scratch("checkpoint.json");
    let mut data = xor_dataset(4);
    let config = TrainConfig::new(1.0, 2, 2, CostFunction::CrossEntropy);

    let (saved_output, points) = {
        let mut net = Network::new(&mut data, xor_layers(2)).unwrap();
        net.train(&config, &mut RandomSource::seeded(3)).unwrap();
        net.checkpoint().save_json(&path).unwrap();
        let points = xor_split(1).inputs;
        (net.predict(&points), points)
    };

    let checkpoint = Checkpoint::load_json(&path).unwrap();
    std::fs::remove_file(&path).ok();
    let mut net = Network::from_checkpoint(&mut data, checkpoint).unwrap();
    assert_eq!(net.epochs_completed(), 2);
    assert_eq!(net.predict(&points), saved_output);

    let resumed = net.train(&config, &mut RandomSource::seeded(4)).unwrap();
    assert_eq!(resumed.iter().map(|s| s.epoch).collect::<Vec<_>>(), vec![3, 4]);
}

#[test]
fn evaluation_handles_both_label_forms() {
    let mut data = xor_dataset(2);
    let net = Network::new(&mut data, xor_layers(9)).unwrap();
    let one_hot = net.evaluate(SplitKind::Training, CostFunction::MeanSquaredError);
    let index = net.evaluate(SplitKind::Test, CostFunction::MeanSquaredError);
    // the training split is the test points twice, with one-hot labels
    assert_eq!(one_hot.correct, 2 * index.correct);
    assert_relative_eq!(one_hot.accuracy, index.accuracy);
    assert_relative_eq!(one_hot.mean_cost, index.mean_cost, epsilon = 1e-12);
}
