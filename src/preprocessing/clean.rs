//! Helper functions for cleaning data

use crate::error::{Result, TabError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How to fill null values during imputation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace nulls with the mean of the non-null values
    Mean,
    /// Replace nulls with the most frequent value
    Mode,
}

impl FromStr for ImputeStrategy {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "avg" | "mean" => Ok(ImputeStrategy::Mean),
            "mode" => Ok(ImputeStrategy::Mode),
            other => Err(TabError::ConfigError(format!(
                "imputation strategy \"{}\" is not supported",
                other
            ))),
        }
    }
}

/// Replace all null values in the named column with an imputed value,
/// returning a new table.
pub fn impute(df: &DataFrame, column: &str, strategy: ImputeStrategy) -> Result<DataFrame> {
    let col = df
        .column(column)
        .map_err(|_| TabError::FeatureNotFound(column.to_string()))?;
    let series = col.as_materialized_series().clone();

    let filled = match strategy {
        ImputeStrategy::Mean => impute_mean(&series, column)?,
        ImputeStrategy::Mode => impute_mode(&series, column)?,
    };

    let mut result = df.clone();
    result = result
        .with_column(filled)
        .map_err(|e| TabError::DataError(e.to_string()))?
        .clone();
    Ok(result)
}

fn impute_mean(series: &Series, column: &str) -> Result<Series> {
    let cast = series
        .cast(&DataType::Float64)
        .map_err(|e| TabError::DataError(e.to_string()))?;
    let ca = cast.f64().map_err(|e| TabError::DataError(e.to_string()))?;

    let present: Vec<f64> = ca.into_iter().flatten().collect();
    if present.is_empty() {
        return Err(TabError::DataError(format!(
            "cannot average column \"{}\": no non-null values",
            column
        )));
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;

    let values: Vec<f64> = ca.into_iter().map(|v| v.unwrap_or(mean)).collect();
    Ok(Series::new(column.into(), values))
}

fn impute_mode(series: &Series, column: &str) -> Result<Series> {
    if series.dtype() == &DataType::String {
        let ca = series
            .str()
            .map_err(|e| TabError::DataError(e.to_string()))?;

        let present: Vec<&str> = ca.into_iter().flatten().collect();
        if present.is_empty() {
            return Err(TabError::DataError(format!(
                "cannot take mode of column \"{}\": no non-null values",
                column
            )));
        }
        let mode = mode_str(&present);

        let values: Vec<&str> = ca.into_iter().map(|v| v.unwrap_or(mode)).collect();
        Ok(Series::new(column.into(), values))
    } else {
        let cast = series
            .cast(&DataType::Float64)
            .map_err(|e| TabError::DataError(e.to_string()))?;
        let ca = cast.f64().map_err(|e| TabError::DataError(e.to_string()))?;

        let mut present: Vec<f64> = ca.into_iter().flatten().collect();
        if present.is_empty() {
            return Err(TabError::DataError(format!(
                "cannot take mode of column \"{}\": no non-null values",
                column
            )));
        }
        present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mode = mode_sorted(&present);

        let values: Vec<f64> = ca.into_iter().map(|v| v.unwrap_or(mode)).collect();
        Ok(Series::new(column.into(), values))
    }
}

/// Most frequent value, first-seen order breaking ties.
fn mode_str<'a>(values: &[&'a str]) -> &'a str {
    let mut best = values[0];
    let mut best_count = 0usize;
    for &candidate in values {
        let count = values.iter().filter(|&&v| v == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Most frequent value of a sorted slice, smallest value breaking ties.
fn mode_sorted(sorted: &[f64]) -> f64 {
    let mut best = sorted[0];
    let mut best_count = 1usize;
    let mut run_start = 0usize;
    for i in 1..=sorted.len() {
        if i == sorted.len() || sorted[i] != sorted[run_start] {
            let run_len = i - run_start;
            if run_len > best_count {
                best = sorted[run_start];
                best_count = run_len;
            }
            run_start = i;
        }
    }
    best
}

/// Names of the string-typed (categorical) columns of a table.
pub fn categorical_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| c.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impute_mean() {
        let df = df!(
            "x" => &[Some(1.0), None, Some(3.0)],
        )
        .unwrap();

        let result = impute(&df, "x", ImputeStrategy::Mean).unwrap();
        let values: Vec<f64> = result
            .column("x")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_impute_mode_string() {
        let df = df!(
            "metro" => &[Some("urban"), Some("urban"), None, Some("rural")],
        )
        .unwrap();

        let result = impute(&df, "metro", ImputeStrategy::Mode).unwrap();
        let values: Vec<&str> = result
            .column("metro")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(values, vec!["urban", "urban", "urban", "rural"]);
    }

    #[test]
    fn test_unsupported_strategy_is_config_error() {
        let err = "median".parse::<ImputeStrategy>().unwrap_err();
        assert!(matches!(err, TabError::ConfigError(_)));
    }

    #[test]
    fn test_impute_all_null_column_fails() {
        let df = df!(
            "x" => &[None::<f64>, None, None],
        )
        .unwrap();
        let err = impute(&df, "x", ImputeStrategy::Mean).unwrap_err();
        assert!(matches!(err, TabError::DataError(_)));
    }

    #[test]
    fn test_categorical_columns() {
        let df = df!(
            "name" => &["a", "b"],
            "x" => &[1.0, 2.0],
        )
        .unwrap();
        assert_eq!(categorical_columns(&df), vec!["name".to_string()]);
    }
}
