//! Equal-frequency binning of continuous columns

use crate::error::{Result, TabError};
use crate::utils::column_f64;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bins continuous columns into groups with the same number of members.
///
/// `fit` computes, independently per configured column, the interior bin-edge
/// thresholds of an `n_bins`-way quantile discretization; `transform` maps
/// each column's values to one-hot membership columns `<column>_bin_<i>`
/// (1-indexed) merged into a copy of the input by row position. Values outside
/// the fitted range fall into the nearest edge bin. The raw column is kept;
/// dropping it is the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binner {
    n_bins: usize,
    columns: Vec<String>,
    // Per column: n_bins - 1 interior edges, ascending
    edges: HashMap<String, Vec<f64>>,
    is_fitted: bool,
}

impl Binner {
    /// Create a binner for the named columns
    pub fn new(n_bins: usize, columns: &[&str]) -> Self {
        Self {
            n_bins,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            edges: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Compute bin edges from the observed distribution of each column.
    ///
    /// Re-fitting overwrites previously fitted edges.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        if self.n_bins < 2 {
            return Err(TabError::ConfigError(format!(
                "n_bins must be at least 2, got {}",
                self.n_bins
            )));
        }

        for col_name in &self.columns {
            let mut values = column_f64(df, col_name)?;
            if values.is_empty() {
                return Err(TabError::DataError(format!(
                    "cannot fit bins on empty column \"{}\"",
                    col_name
                )));
            }
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let edges: Vec<f64> = (1..self.n_bins)
                .map(|i| quantile(&values, i as f64 / self.n_bins as f64))
                .collect();
            self.edges.insert(col_name.clone(), edges);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Merge one-hot bin-membership columns into a copy of the table.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TabError::ModelNotFitted);
        }

        let mut new_cols: Vec<Column> = Vec::new();

        for col_name in &self.columns {
            let values = column_f64(df, col_name)?;
            let edges = self.edges.get(col_name).ok_or_else(|| {
                TabError::PreprocessingError(format!(
                    "no fitted edges for column \"{}\"",
                    col_name
                ))
            })?;

            let bin_indices: Vec<usize> = values
                .iter()
                .map(|&v| edges.partition_point(|&e| e <= v))
                .collect();

            for bin in 0..self.n_bins {
                let name = format!("{}_bin_{}", col_name, bin + 1);
                let indicators: Vec<f64> = bin_indices
                    .iter()
                    .map(|&idx| if idx == bin { 1.0 } else { 0.0 })
                    .collect();
                new_cols.push(Series::new(name.into(), indicators).into());
            }
        }

        df.hstack(&new_cols)
            .map_err(|e| TabError::DataError(e.to_string()))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// The fitted interior edges of a column
    pub fn edges(&self, column: &str) -> Option<&[f64]> {
        self.edges.get(column).map(|e| e.as_slice())
    }
}

/// Quantile of a sorted slice with linear interpolation.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}
