use crate::math::matrix::Matrix;

pub struct MeanSquaredError;

impl MeanSquaredError {
    /// Scalar cost summed over the batch: 0.5 · Σ_cols ‖predicted - target‖²
    pub fn eval(predicted: &Matrix, target: &Matrix) -> f64 {
        0.5 * predicted.zip_map(target, |p, t| (p - t) * (p - t)).sum()
    }

    /// Gradient w.r.t. the prediction: predicted - target
    pub fn deriv(predicted: &Matrix, target: &Matrix) -> Matrix {
        predicted - target
    }
}
