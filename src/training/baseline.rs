//! Stratified dummy baseline

use super::models::{check_shapes, Model};
use crate::error::{Result, TabError};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Dummy classifier that samples labels at the training positive rate.
///
/// Prediction is seeded, so repeated calls on the same input produce the same
/// labels. Exposes no ranking score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratifiedBaseline {
    seed: u64,
    positive_rate: Option<f64>,
}

impl StratifiedBaseline {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            positive_rate: None,
        }
    }
}

impl Model for StratifiedBaseline {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_shapes(x, y)?;
        if y.is_empty() {
            return Err(TabError::TrainingError(
                "cannot fit baseline on empty training set".to_string(),
            ));
        }
        self.positive_rate = Some(y.iter().sum::<f64>() / y.len() as f64);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let rate = self.positive_rate.ok_or(TabError::ModelNotFitted)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|_| if rng.gen::<f64>() < rate { 1.0 } else { 0.0 })
            .collect();
        Ok(Array1::from_vec(predictions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_predictions_follow_class_rate() {
        let x = Array2::zeros((1000, 1));
        let y = Array1::from_vec([vec![1.0; 300], vec![0.0; 700]].concat());

        let mut model = StratifiedBaseline::new(42);
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        let rate = predictions.iter().sum::<f64>() / predictions.len() as f64;
        assert!((rate - 0.3).abs() < 0.05, "rate was {}", rate);
    }

    #[test]
    fn test_seeded_predictions_repeat() {
        let x = array![[0.0], [0.0], [0.0], [0.0]];
        let y = array![1.0, 0.0, 1.0, 0.0];

        let mut model = StratifiedBaseline::new(7);
        model.fit(&x, &y).unwrap();

        assert_eq!(model.predict(&x).unwrap(), model.predict(&x).unwrap());
    }

    #[test]
    fn test_no_score_capability() {
        let model = StratifiedBaseline::new(0);
        assert!(!model.has_score());
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = StratifiedBaseline::new(0);
        let err = model.predict(&array![[1.0]]).unwrap_err();
        assert!(matches!(err, TabError::ModelNotFitted));
    }
}
