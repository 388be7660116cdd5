//! Model scoring against held-out tables

use super::collection::ResultCollection;
use super::result::PredictionResult;
use crate::error::{Result, TabError};
use crate::training::BoxedModel;
use crate::utils::features_and_label;
use polars::prelude::*;

/// Applies fitted models to held-out test tables.
///
/// Mirrors the [`Trainer`](crate::training::Trainer) shape: one table per
/// split window, scored by the matching model.
pub struct Tester {
    tables: Vec<DataFrame>,
    label: String,
}

impl Tester {
    /// Tester over a single test table
    pub fn new(table: DataFrame, label: &str) -> Self {
        Self {
            tables: vec![table],
            label: label.to_string(),
        }
    }

    /// Tester over one table per split window
    pub fn from_tables(tables: Vec<DataFrame>, label: &str) -> Self {
        Self {
            tables,
            label: label.to_string(),
        }
    }

    /// Test tables held by this tester
    pub fn tables(&self) -> &[DataFrame] {
        &self.tables
    }

    /// Score each model against its table, in table order.
    ///
    /// Fails before any scoring when the model and table counts differ.
    pub fn test(&self, models: &[BoxedModel]) -> Result<Vec<PredictionResult>> {
        if models.len() != self.tables.len() {
            return Err(TabError::CardinalityError {
                models: models.len(),
                tables: self.tables.len(),
            });
        }

        let mut results = Vec::with_capacity(models.len());
        for (idx, (model, table)) in models.iter().zip(self.tables.iter()).enumerate() {
            let (x, y) = features_and_label(table, &self.label)?;
            tracing::debug!(table = idx, rows = x.nrows(), "scoring model");

            let predicted = model.predict(&x)?;
            let score = if model.has_score() {
                Some(model.score(&x)?.to_vec())
            } else {
                None
            };
            results.push(PredictionResult::new(y.to_vec(), predicted.to_vec(), score)?);
        }
        Ok(results)
    }

    /// Evaluate several families into one metric table.
    ///
    /// With no thresholds the metric rows are the per-split results, indexed
    /// 1..N. With thresholds (single test table only) each family's one
    /// result is re-read under every threshold, indexed by threshold value.
    /// Families join in the given order, metric columns suffixed by family
    /// name.
    pub fn evaluate(
        &self,
        families: &[(String, Vec<BoxedModel>)],
        thresholds: &[f64],
    ) -> Result<ResultCollection> {
        let index: Vec<f64> = if thresholds.is_empty() {
            (1..=self.tables.len()).map(|i| i as f64).collect()
        } else {
            if self.tables.len() != 1 {
                return Err(TabError::ValidationError(format!(
                    "threshold evaluation needs exactly one test table, got {}",
                    self.tables.len()
                )));
            }
            thresholds.to_vec()
        };

        let mut collection = ResultCollection::empty(index.clone());
        for (name, models) in families {
            tracing::info!(family = name.as_str(), "evaluating family");
            let results = self.test(models)?;

            let stacked = if thresholds.is_empty() {
                ResultCollection::from_stack(&results, None)?
            } else {
                let base = &results[0];
                let thresholded = thresholds
                    .iter()
                    .map(|&t| base.with_threshold(t))
                    .collect::<Result<Vec<_>>>()?;
                ResultCollection::from_stack(&thresholded, Some(index.clone()))?
            };
            collection.join(name, &stacked)?;
        }
        Ok(collection)
    }
}
