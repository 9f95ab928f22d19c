use mlp_trainer::{
    ActivationFunction, CostFunction, Labels, Layer, Layout, Matrix, MemoryDataset, Network, RandomSource, Split,
    SplitKind, TrainConfig,
};

/// `copies` shuffled repetitions of the four XOR points, one per column.
fn xor_split(copies: usize, rng: &mut RandomSource) -> mlp_trainer::Result<Split> {
    let mut columns = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..copies {
        for (a, b) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            columns.push(vec![a as f64, b as f64]);
            labels.push(a ^ b);
        }
    }
    let mut split = Split::new(Matrix::from_columns(&columns), Labels::Index(labels))?;
    split.permute(&rng.permutation(split.len()));
    Ok(split)
}

fn main() -> mlp_trainer::Result<()> {
    let mut rng = RandomSource::seeded(42);
    let training = xor_split(225, &mut rng)?;
    let validation = xor_split(25, &mut rng)?;
    let test = xor_split(25, &mut rng)?;
    let mut data = MemoryDataset::new(training, validation, test, 2, Layout::Tabular)?;

    let layers = vec![
        Layer::new(2, 4, ActivationFunction::Sigmoid, &mut rng),
        Layer::new(4, 2, ActivationFunction::Sigmoid, &mut rng),
    ];
    let mut network = Network::new(&mut data, layers)?;

    let config = TrainConfig::new(1.0, 5, 2, CostFunction::CrossEntropy)
        .with_lambda(1.0)
        .with_validation(true)
        .with_test(true);

    for stats in network.train(&config, &mut rng)? {
        println!("{stats}");
    }

    let points = Matrix::from_columns(&[vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]]);
    let output = network.predict(&points);
    for j in 0..points.cols {
        println!("Input: {:?} -> class {} ({:.4?})", points.column(j), output.argmax_column(j), output.column(j));
    }

    let eval = network.evaluate(SplitKind::Test, CostFunction::CrossEntropy);
    println!("Test accuracy: {:.2}%", eval.accuracy * 100.0);
    Ok(())
}
