use crate::math::matrix::Matrix;

/// Element-wise binary cross-entropy, summed over outputs and batch.
///
/// Saturated predictions (exactly 0 or 1) make `ln` and the derivative's
/// denominator blow up. Every element term that comes out non-finite is
/// replaced by 0, so a perfectly correct extreme prediction contributes
/// nothing instead of poisoning the sum with NaN or infinity.
pub struct CrossEntropy;

impl CrossEntropy {
    /// -Σ (t·ln p + (1-t)·ln(1-p))
    pub fn eval(predicted: &Matrix, target: &Matrix) -> f64 {
        -predicted
            .zip_map(target, |p, t| finite_or_zero(t * p.ln() + (1.0 - t) * (1.0 - p).ln()))
            .sum()
    }

    /// -(p - t) / (p·(p - 1))
    pub fn deriv(predicted: &Matrix, target: &Matrix) -> Matrix {
        predicted.zip_map(target, |p, t| finite_or_zero(-(p - t) / (p * (p - 1.0))))
    }
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matches_closed_form_inside_the_unit_interval() {
        let p = Matrix::from_data(vec![vec![0.8], vec![0.3]]);
        let t = Matrix::from_data(vec![vec![1.0], vec![0.0]]);
        let expected = -(0.8f64.ln() + 0.7f64.ln());
        assert_relative_eq!(CrossEntropy::eval(&p, &t), expected, epsilon = 1e-12);

        let d = CrossEntropy::deriv(&p, &t);
        assert_relative_eq!(d.get(0, 0), -1.0 / 0.8, epsilon = 1e-12);
        assert_relative_eq!(d.get(1, 0), 1.0 / 0.7, epsilon = 1e-12);
    }

    #[test]
    fn finite_for_open_interval_predictions() {
        let values = [1e-12, 1e-6, 0.01, 0.5, 0.99, 1.0 - 1e-12];
        for &p in &values {
            for &t in &[0.0, 1.0, 0.25] {
                let pm = Matrix::column_vector(&[p]);
                let tm = Matrix::column_vector(&[t]);
                assert!(CrossEntropy::eval(&pm, &tm).is_finite());
                assert!(CrossEntropy::deriv(&pm, &tm).get(0, 0).is_finite());
            }
        }
    }

    #[test]
    fn exact_boundary_match_contributes_nothing() {
        let p = Matrix::column_vector(&[0.0, 1.0]);
        let t = Matrix::column_vector(&[0.0, 1.0]);
        assert_eq!(CrossEntropy::eval(&p, &t), 0.0);
        assert_eq!(CrossEntropy::deriv(&p, &t), Matrix::column_vector(&[0.0, 0.0]));
    }

    #[test]
    fn wrong_saturated_prediction_is_zeroed_not_infinite() {
        let p = Matrix::column_vector(&[1.0]);
        let t = Matrix::column_vector(&[0.0]);
        assert_eq!(CrossEntropy::eval(&p, &t), 0.0);
        assert_eq!(CrossEntropy::deriv(&p, &t).get(0, 0), 0.0);
    }
}
