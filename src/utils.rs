//! DataFrame to ndarray conversion helpers

use crate::error::{Result, TabError};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Extract one column as a dense `f64` vector.
///
/// Numeric columns are cast to `f64`; a null anywhere is a data error.
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| TabError::FeatureNotFound(name.to_string()))?;
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| TabError::DataError(e.to_string()))?;
    let ca = series.f64().map_err(|e| TabError::DataError(e.to_string()))?;

    ca.into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                TabError::DataError(format!("null value in column \"{}\"", name))
            })
        })
        .collect()
}

/// Convert every column of the frame to one dense `f64` matrix, row-major,
/// columns in frame order.
pub fn to_matrix(df: &DataFrame) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = df.width();

    let mut data = Array2::zeros((n_rows, n_cols));
    for (j, column) in df.get_columns().iter().enumerate() {
        let values = column_f64(df, column.name().as_str())?;
        for (i, v) in values.into_iter().enumerate() {
            data[[i, j]] = v;
        }
    }

    Ok(data)
}

/// Split a frame into a feature matrix (all columns except the label) and a
/// label vector, the shape every model family consumes.
pub fn features_and_label(df: &DataFrame, label: &str) -> Result<(Array2<f64>, Array1<f64>)> {
    if df.column(label).is_err() {
        return Err(TabError::FeatureNotFound(label.to_string()));
    }

    let features = df
        .drop(label)
        .map_err(|e| TabError::DataError(e.to_string()))?;
    let x = to_matrix(&features)?;
    let y = Array1::from_vec(column_f64(df, label)?);

    Ok((x, y))
}
