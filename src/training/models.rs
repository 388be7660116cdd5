//! The polymorphic model interface

use crate::error::{Result, TabError};
use ndarray::{Array1, Array2};

/// A binary classifier over dense feature matrices.
///
/// Labels are 0.0/1.0. Every model can `fit` and `predict`; models that can
/// rank rows additionally expose `score` and advertise it via `has_score`
/// (decision-function value or positive-class probability, per family).
pub trait Model: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict 0.0/1.0 point labels
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Whether this model exposes a ranking score
    fn has_score(&self) -> bool {
        false
    }

    /// Real-valued ranking scores, higher meaning more likely positive
    fn score(&self, _x: &Array2<f64>) -> Result<Array1<f64>> {
        Err(TabError::ValidationError(
            "model does not expose a ranking score".to_string(),
        ))
    }
}

/// Owned trait object, the shape the Trainer hands to the Tester
pub type BoxedModel = Box<dyn Model>;

/// Shape check shared by the fit implementations.
pub(crate) fn check_shapes(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(TabError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    struct NoScore;

    impl Model for NoScore {
        fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
            Ok(())
        }
        fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
            Ok(Array1::zeros(x.nrows()))
        }
    }

    #[test]
    fn test_score_defaults_to_unavailable() {
        let model = NoScore;
        assert!(!model.has_score());
        assert!(model.score(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_shape_check() {
        let x = array![[1.0], [2.0]];
        let y = array![0.0];
        assert!(check_shapes(&x, &y).is_err());
    }
}
