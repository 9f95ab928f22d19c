use crate::{
    cost::cost_function::CostFunction,
    data::dataset::Split,
    layers::dense::Layer,
    network::network::predict_with,
};

/// One example the network got wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct Misclassified {
    /// Column index within the evaluated split.
    pub index: usize,
    pub input: Vec<f64>,
    pub predicted: usize,
    pub actual: usize,
}

/// Outcome of evaluating a whole split.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
    /// `correct / total`, 0 for an empty split.
    pub accuracy: f64,
    /// Cost summed over the split divided by its size, 0 for an empty split.
    pub mean_cost: f64,
    pub misclassified: Vec<Misclassified>,
}

/// Predicted class (argmax of the output column) for every example.
pub fn classify(layers: &[Layer], split: &Split) -> Vec<usize> {
    if split.is_empty() {
        return Vec::new();
    }
    let output = predict_with(layers, &split.inputs);
    (0..output.cols).map(|j| output.argmax_column(j)).collect()
}

/// Single forward pass over the whole split, no batching.
pub fn evaluate_split(layers: &[Layer], split: &Split, n_outputs: usize, cost: CostFunction) -> Evaluation {
    let total = split.len();
    if total == 0 {
        return Evaluation { correct: 0, total: 0, accuracy: 0.0, mean_cost: 0.0, misclassified: Vec::new() };
    }

    let output = predict_with(layers, &split.inputs);
    let mean_cost = cost.eval(&output, &split.labels.to_one_hot(n_outputs)) / total as f64;

    let misclassified: Vec<Misclassified> = (0..total)
        .filter_map(|j| {
            let predicted = output.argmax_column(j);
            let actual = split.labels.class_of(j);
            (predicted != actual).then(|| Misclassified { index: j, input: split.example(j), predicted, actual })
        })
        .collect();
    let correct = total - misclassified.len();

    Evaluation {
        correct,
        total,
        accuracy: correct as f64 / total as f64,
        mean_cost,
        misclassified,
    }
}
