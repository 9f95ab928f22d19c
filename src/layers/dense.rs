use serde::{Serialize, Deserialize};

use crate::{
    activation::activation::ActivationFunction,
    layers::init::Initializer,
    math::{matrix::Matrix, random::RandomSource},
    optim::sgd::{Sgd, UpdatePolicy},
};

/// A fully connected layer: `a_out = σ(W·a_in + b)`.
///
/// Inputs and outputs are batches laid out one example per column. The layer
/// caches the last input and pre-activation so that a single `backward` can
/// follow each `forward`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub n_inputs: usize,
    pub n_outputs: usize,
    /// Shape `n_outputs × n_inputs`.
    pub weights: Matrix,
    pub biases: Vec<f64>,
    pub activator: ActivationFunction,
    #[serde(skip)]
    a_in: Matrix,
    #[serde(skip)]
    z: Matrix,  // z = W·a_in + b from the last forward
    #[serde(skip)]
    acc_weights: Matrix,
    #[serde(skip)]
    acc_biases: Vec<f64>,
    #[serde(skip)]
    acc_count: usize,
}

/// Gradients produced by one backward pass, summed over the batch columns.
#[derive(Debug, Clone)]
pub struct Gradients {
    /// ∂C/∂W, `n_outputs × n_inputs`.
    pub weights: Matrix,
    /// ∂C/∂b, length `n_outputs`.
    pub biases: Vec<f64>,
    /// ∂C/∂a_in, to feed the previous layer's backward pass.
    pub input: Matrix,
}

impl Layer {
    /// Builds a layer with N(0, 1) weights and biases.
    pub fn new(n_inputs: usize, n_outputs: usize, activation: ActivationFunction, rng: &mut RandomSource) -> Layer {
        Layer::with_initializer(n_inputs, n_outputs, activation, Initializer::StandardNormal, rng)
    }

    pub fn with_initializer(
        n_inputs: usize,
        n_outputs: usize,
        activation: ActivationFunction,
        initializer: Initializer,
        rng: &mut RandomSource,
    ) -> Layer {
        let weights = initializer.weights(n_inputs, n_outputs, rng);
        let biases = initializer.biases(n_outputs, rng);
        Layer::with_parameters(weights, biases, activation)
    }

    /// Builds a layer from explicit parameters.
    ///
    /// # Panics
    /// Panics if `biases.len() != weights.rows`.
    pub fn with_parameters(weights: Matrix, biases: Vec<f64>, activation: ActivationFunction) -> Layer {
        assert_eq!(
            weights.rows,
            biases.len(),
            "bias length must equal the number of weight rows"
        );
        Layer {
            n_inputs: weights.cols,
            n_outputs: weights.rows,
            weights,
            biases,
            activator: activation,
            a_in: Matrix::default(),
            z: Matrix::default(),
            acc_weights: Matrix::default(),
            acc_biases: Vec::new(),
            acc_count: 0,
        }
    }

    /// Checks the shape invariants; used after deserialization.
    pub fn is_consistent(&self) -> bool {
        self.weights.rows == self.n_outputs
            && self.weights.cols == self.n_inputs
            && self.biases.len() == self.n_outputs
            && self.weights.data.iter().all(|row| row.len() == self.n_inputs)
    }

    /// Pre-activation `W·a_in + b` with the bias broadcast over every column.
    fn affine(&self, a_in: &Matrix) -> Matrix {
        assert_eq!(
            a_in.rows, self.n_inputs,
            "layer expects {} input rows, got {}", self.n_inputs, a_in.rows
        );
        (&self.weights * a_in).add_column(&self.biases)
    }

    /// Forward pass; caches `a_in` and `z` for the following backward pass.
    pub fn forward(&mut self, a_in: &Matrix) -> Matrix {
        let z = self.affine(a_in);
        let a = self.activator.eval(&z);
        self.a_in = a_in.clone();
        self.z = z;
        a
    }

    /// Forward pass without touching the backprop caches.
    pub fn infer(&self, a_in: &Matrix) -> Matrix {
        self.activator.eval(&self.affine(a_in))
    }

    /// Gradients for the most recent `forward`, given `dc_da_out` = ∂C/∂a_out.
    pub fn compute_gradients(&self, dc_da_out: &Matrix) -> Gradients {
        assert_eq!(
            dc_da_out.shape(),
            self.z.shape(),
            "backward called with a gradient that does not match the last forward pass"
        );
        let delta = dc_da_out.hadamard(&self.activator.deriv(&self.z));

        Gradients {
            weights: &delta * &self.a_in.transpose(),
            biases: delta.row_sums(),
            input: &self.weights.transpose() * &delta,
        }
    }

    /// Backward pass. Returns ∂C/∂a_in, computed with the weights as they were
    /// before this call's update.
    pub fn backward(&mut self, dc_da_out: &Matrix, optimizer: &Sgd, policy: UpdatePolicy) -> Matrix {
        let grads = self.compute_gradients(dc_da_out);
        let batch_size = self.a_in.cols;
        match policy {
            UpdatePolicy::Immediate => {
                optimizer.step(self, &grads.weights, &grads.biases, batch_size);
            }
            UpdatePolicy::Accumulate => self.accumulate(&grads.weights, &grads.biases, batch_size),
        }
        grads.input
    }

    /// Adds gradients summed over `examples` columns to the accumulators.
    pub fn accumulate(&mut self, weights_grad: &Matrix, biases_grad: &[f64], examples: usize) {
        if self.acc_count == 0 {
            self.acc_weights = weights_grad.clone();
            self.acc_biases = biases_grad.to_vec();
        } else {
            self.acc_weights = &self.acc_weights + weights_grad;
            for (acc, g) in self.acc_biases.iter_mut().zip(biases_grad) {
                *acc += g;
            }
        }
        self.acc_count += examples;
    }

    /// Number of examples accumulated since the last flush.
    pub fn pending_examples(&self) -> usize {
        self.acc_count
    }

    /// Applies the averaged accumulated update and clears the accumulators.
    /// Does nothing if nothing was accumulated.
    pub fn flush(&mut self, optimizer: &Sgd) {
        if self.acc_count == 0 {
            return;
        }
        let weights_grad = std::mem::take(&mut self.acc_weights);
        let biases_grad = std::mem::take(&mut self.acc_biases);
        let count = self.acc_count;
        self.acc_count = 0;
        optimizer.step(self, &weights_grad, &biases_grad, count);
    }

    /// `W ← W - scale·dW - decay·W`, `b ← b - scale·db`.
    pub fn apply_gradients(&mut self, weights_grad: &Matrix, biases_grad: &[f64], scale: f64, decay: f64) {
        assert_eq!(weights_grad.shape(), self.weights.shape(), "weight gradient has the wrong shape");
        assert_eq!(biases_grad.len(), self.biases.len(), "bias gradient has the wrong length");
        self.weights = self.weights.zip_map(weights_grad, |w, g| w - scale * g - decay * w);
        for (b, g) in self.biases.iter_mut().zip(biases_grad) {
            *b -= scale * g;
        }
    }
}
