//! Fixed-vocabulary one-hot encoding with an explicit unknown fallback

use crate::error::{Result, TabError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Known category values per categorical column.
///
/// A domain is established once, when an encoder is fitted, and is immutable
/// afterwards: replaying the same domain on a different table reproduces the
/// exact indicator schema, with values unseen at fit time routed to the
/// `_is_unknown` column instead of growing the vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    categories: HashMap<String, Vec<String>>,
}

impl Domain {
    /// Create an empty domain
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the category values of one column, in first-seen order
    pub fn set(&mut self, column: &str, values: Vec<String>) {
        self.categories.insert(column.to_string(), values);
    }

    /// Category values known for a column
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.categories.get(column).map(|v| v.as_slice())
    }

    /// Whether a value belongs to a column's vocabulary
    pub fn contains(&self, column: &str, value: &str) -> bool {
        self.categories
            .get(column)
            .map(|vals| vals.iter().any(|v| v == value))
            .unwrap_or(false)
    }
}

/// Converts categorical columns into indicator columns.
///
/// For each configured column and each value in the column's domain, emits a
/// 0.0/1.0 column named `<column>_is_<value>` (value lower-cased, spaces
/// replaced with underscores), plus one `<column>_is_unknown` column that is
/// 1.0 exactly for rows whose value is absent from the domain. The original
/// categorical column is kept; dropping it is the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    columns: Vec<String>,
    domain: Option<Domain>,
}

impl CategoricalEncoder {
    /// Create an encoder that will derive its domain at fit time
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            domain: None,
        }
    }

    /// Create an encoder that replays a pre-existing domain
    pub fn with_domain(columns: &[&str], domain: Domain) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            domain: Some(domain),
        }
    }

    /// Derive the domain from the values observed in the given table.
    ///
    /// Overwrites any previously held domain.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let mut domain = Domain::new();

        for col_name in &self.columns {
            let column = df
                .column(col_name)
                .map_err(|_| TabError::FeatureNotFound(col_name.to_string()))?;
            let series = column.as_materialized_series();
            let ca = series
                .str()
                .map_err(|e| TabError::DataError(e.to_string()))?;

            let mut seen: Vec<String> = Vec::new();
            for val in ca.into_iter().flatten() {
                if !seen.iter().any(|s| s == val) {
                    seen.push(val.to_string());
                }
            }
            domain.set(col_name, seen);
        }

        self.domain = Some(domain);
        Ok(self)
    }

    /// Append indicator columns to a copy of the table.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let domain = self.domain.as_ref().ok_or(TabError::ModelNotFitted)?;

        let mut new_cols: Vec<Column> = Vec::new();

        for col_name in &self.columns {
            let column = df
                .column(col_name)
                .map_err(|_| TabError::FeatureNotFound(col_name.to_string()))?;
            let series = column.as_materialized_series();
            let ca = series
                .str()
                .map_err(|e| TabError::DataError(e.to_string()))?;
            let values: Vec<Option<String>> = ca
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect();

            let categories = domain.categories(col_name).ok_or_else(|| {
                TabError::PreprocessingError(format!(
                    "domain has no categories for column \"{}\"",
                    col_name
                ))
            })?;

            // One indicator per domain value, even if the value never occurs
            // in this table, so train and test schemas stay identical.
            for category in categories {
                let name = format!("{}_is_{}", col_name, pretty_name(category));
                let indicators: Vec<f64> = values
                    .iter()
                    .map(|v| match v {
                        Some(s) if s == category => 1.0,
                        _ => 0.0,
                    })
                    .collect();
                new_cols.push(Series::new(name.into(), indicators).into());
            }

            let unknown_name = format!("{}_is_unknown", col_name);
            let unknown: Vec<f64> = values
                .iter()
                .map(|v| match v {
                    Some(s) if !domain.contains(col_name, s) => 1.0,
                    _ => 0.0,
                })
                .collect();
            new_cols.push(Series::new(unknown_name.into(), unknown).into());
        }

        df.hstack(&new_cols)
            .map_err(|e| TabError::DataError(e.to_string()))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// The domain in effect, once fitted or supplied
    pub fn domain(&self) -> Option<&Domain> {
        self.domain.as_ref()
    }
}

fn pretty_name(value: &str) -> String {
    value.to_lowercase().replace(' ', "_")
}
