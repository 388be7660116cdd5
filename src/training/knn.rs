//! K-nearest neighbors classifier

use super::models::{check_shapes, Model};
use crate::error::{Result, TabError};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Brute-force Euclidean KNN.
///
/// The ranking score is the positive fraction among the k neighbors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    /// Number of neighbors
    pub n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl KnnClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            x_train: None,
            y_train: None,
        }
    }

    /// Positive fraction among the neighbors of each row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or(TabError::ModelNotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(TabError::ModelNotFitted)?;
        let k = self.n_neighbors;

        let probabilities: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row: Vec<f64> = x.row(i).to_vec();
                let neighbors = find_k_nearest(&row, x_train, y_train, k);
                let positives: f64 = neighbors.iter().map(|&(_, label)| label).sum();
                positives / neighbors.len() as f64
            })
            .collect();

        Ok(Array1::from_vec(probabilities))
    }
}

/// Max-heap entry for partial sort (keeps k smallest distances)
#[derive(PartialEq)]
struct DistLabel(f64, f64);

impl Eq for DistLabel {}
impl PartialOrd for DistLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}
impl Ord for DistLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Find k nearest neighbors using a max-heap
fn find_k_nearest(
    point: &[f64],
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
) -> Vec<(f64, f64)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let dist: f64 = point
            .iter()
            .zip(row.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum::<f64>()
            .sqrt();

        if heap.len() < k {
            heap.push(DistLabel(dist, y_train[i]));
        } else if let Some(top) = heap.peek() {
            if dist < top.0 {
                heap.pop();
                heap.push(DistLabel(dist, y_train[i]));
            }
        }
    }

    heap.into_iter().map(|dl| (dl.0, dl.1)).collect()
}

impl Model for KnnClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_shapes(x, y)?;
        if self.n_neighbors == 0 {
            return Err(TabError::ConfigError(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        if x.nrows() == 0 {
            return Err(TabError::TrainingError(
                "cannot fit knn on empty training set".to_string(),
            ));
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn has_score(&self) -> bool {
        true
    }

    fn score(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.predict_proba(x)
    }
}
