//! Linear support vector machine

use super::models::{check_shapes, Model};
use crate::error::{Result, TabError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Linear SVM fitted by hinge-loss subgradient descent.
///
/// Features are always standardized (z-score) first; the fitted mean and
/// standard deviation are replayed at prediction time. The ranking score is
/// the signed distance to the separating hyperplane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    /// Regularization strength (larger = less regularization)
    pub c: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance
    pub tol: f64,
    /// Learning rate
    pub learning_rate: f64,
    weights: Option<Array1<f64>>,
    bias: f64,
    means: Option<Array1<f64>>,
    stds: Option<Array1<f64>>,
}

impl LinearSvm {
    pub fn new(c: f64) -> Self {
        Self {
            c,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            weights: None,
            bias: 0.0,
            means: None,
            stds: None,
        }
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    fn standardize(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let means = self.means.as_ref().ok_or(TabError::ModelNotFitted)?;
        let stds = self.stds.as_ref().ok_or(TabError::ModelNotFitted)?;

        let mut scaled = x.clone();
        for (j, mut column) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let mean = means[j];
            let std = stds[j];
            column.mapv_inplace(|v| (v - mean) / std);
        }
        Ok(scaled)
    }

    /// Signed distance to the hyperplane, in standardized feature space
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let weights = self.weights.as_ref().ok_or(TabError::ModelNotFitted)?;
        let scaled = self.standardize(x)?;
        Ok(scaled.dot(weights) + self.bias)
    }
}

impl Model for LinearSvm {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_shapes(x, y)?;
        if self.c <= 0.0 {
            return Err(TabError::ConfigError(format!(
                "regularization strength must be positive, got {}",
                self.c
            )));
        }

        let n_samples = x.nrows();
        let n_features = x.ncols();

        // Fit the standardization, zero-variance columns scale by 1
        let means = x.mean_axis(Axis(0)).ok_or_else(|| {
            TabError::TrainingError("cannot fit svm on empty training set".to_string())
        })?;
        let stds = x
            .axis_iter(Axis(1))
            .map(|col| {
                let mean = col.mean().unwrap_or(0.0);
                let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / col.len() as f64;
                let std = var.sqrt();
                if std > 0.0 {
                    std
                } else {
                    1.0
                }
            })
            .collect::<Array1<f64>>();
        self.means = Some(means);
        self.stds = Some(stds);

        let scaled = self.standardize(x)?;
        // Hinge loss wants labels in {-1, +1}
        let signed = y.mapv(|v| if v > 0.5 { 1.0 } else { -1.0 });

        let mut weights: Array1<f64> = Array1::zeros(n_features);
        let mut bias = 0.0;
        let lr = self.learning_rate;

        for _iter in 0..self.max_iter {
            let margins = &scaled.dot(&weights) + bias;

            let mut dw = &weights / self.c;
            let mut db = 0.0;
            for i in 0..n_samples {
                if signed[i] * margins[i] < 1.0 {
                    let row = scaled.row(i);
                    let scale = signed[i] / n_samples as f64;
                    dw.scaled_add(-scale, &row);
                    db -= scale;
                }
            }

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - lr * &dw;
            bias -= lr * db;
        }

        self.weights = Some(weights);
        self.bias = bias;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let decision = self.decision_function(x)?;
        Ok(decision.mapv(|d| if d >= 0.0 { 1.0 } else { 0.0 }))
    }

    fn has_score(&self) -> bool {
        true
    }

    fn score(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.decision_function(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0, 2.0],
            [2.0, 1.0],
            [1.5, 1.5],
            [2.0, 2.0],
            [8.0, 9.0],
            [9.0, 8.0],
            [8.5, 8.5],
            [9.0, 9.0],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_separates_classes() {
        let (x, y) = separable_data();
        let mut svm = LinearSvm::new(1.0);
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_decision_function_ranks_positives_higher() {
        let (x, y) = separable_data();
        let mut svm = LinearSvm::new(1.0);
        svm.fit(&x, &y).unwrap();

        assert!(svm.has_score());
        let scores = svm.score(&x).unwrap();
        let worst_positive = (4..8).map(|i| scores[i]).fold(f64::INFINITY, f64::min);
        let best_negative = (0..4).map(|i| scores[i]).fold(f64::NEG_INFINITY, f64::max);
        assert!(worst_positive > best_negative);
    }

    #[test]
    fn test_non_positive_c_rejected() {
        let (x, y) = separable_data();
        let mut svm = LinearSvm::new(0.0);
        assert!(matches!(
            svm.fit(&x, &y).unwrap_err(),
            TabError::ConfigError(_)
        ));
    }

    #[test]
    fn test_constant_column_does_not_break_standardization() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [8.0, 5.0], [9.0, 5.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut svm = LinearSvm::new(1.0);
        svm.fit(&x, &y).unwrap();
        let predictions = svm.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }
}
