//! Cross-split and cross-family metric aggregation

use super::result::PredictionResult;
use crate::error::{Result, TabError};
use polars::prelude::*;

const METRIC_COLUMNS: [&str; 5] = ["accuracy", "precision", "recall", "f1", "auc"];

/// Append-only metric table keyed by an index (split number or threshold).
///
/// Each joined name contributes one suffixed copy of the metric columns, so
/// families evaluated over the same splits line up row by row.
#[derive(Debug, Clone)]
pub struct ResultCollection {
    index: Vec<f64>,
    frame: DataFrame,
    names: Vec<String>,
}

impl ResultCollection {
    /// Empty collection over a fixed index
    pub fn empty(index: Vec<f64>) -> Self {
        Self {
            index,
            frame: DataFrame::empty(),
            names: Vec::new(),
        }
    }

    /// One metric row per result, indexed 1..N by default.
    pub fn from_stack(results: &[PredictionResult], index: Option<Vec<f64>>) -> Result<Self> {
        let index = match index {
            Some(idx) => {
                if idx.len() != results.len() {
                    return Err(TabError::ShapeError {
                        expected: format!("{} index values", results.len()),
                        actual: format!("{} index values", idx.len()),
                    });
                }
                idx
            }
            None => (1..=results.len()).map(|i| i as f64).collect(),
        };

        let summaries: Vec<_> = results.iter().map(|r| r.as_series()).collect();
        let columns = vec![
            Column::new(
                "accuracy".into(),
                summaries.iter().map(|s| s.accuracy).collect::<Vec<f64>>(),
            ),
            Column::new(
                "precision".into(),
                summaries.iter().map(|s| s.precision).collect::<Vec<f64>>(),
            ),
            Column::new(
                "recall".into(),
                summaries.iter().map(|s| s.recall).collect::<Vec<f64>>(),
            ),
            Column::new(
                "f1".into(),
                summaries.iter().map(|s| s.f1).collect::<Vec<f64>>(),
            ),
            Column::new(
                "auc".into(),
                summaries.iter().map(|s| s.auc).collect::<Vec<f64>>(),
            ),
        ];

        Ok(Self {
            index,
            frame: DataFrame::new(columns)?,
            names: Vec::new(),
        })
    }

    /// Join another collection's metrics, suffixing each column with
    /// `_<name>`. Index vectors must match value for value.
    pub fn join(&mut self, name: &str, other: &ResultCollection) -> Result<()> {
        if self.index != other.index {
            return Err(TabError::ValidationError(format!(
                "cannot join \"{}\": index mismatch ({} vs {} rows)",
                name,
                self.index.len(),
                other.index.len()
            )));
        }

        let suffixed: Vec<Column> = METRIC_COLUMNS
            .into_iter()
            .map(|metric| {
                let column = other.frame.column(metric)?;
                let mut renamed = column.clone();
                renamed.rename(format!("{}_{}", metric, name).into());
                Ok(renamed)
            })
            .collect::<Result<Vec<_>>>()?;

        if self.frame.width() == 0 {
            self.frame = DataFrame::new(suffixed)?;
        } else {
            self.frame = self.frame.hstack(&suffixed)?;
        }
        self.names.push(name.to_string());
        Ok(())
    }

    /// Single-result shorthand for [`join`](Self::join)
    pub fn add(&mut self, name: &str, result: &PredictionResult) -> Result<()> {
        let single =
            Self::from_stack(std::slice::from_ref(result), Some(self.index.clone()))?;
        self.join(name, &single)
    }

    /// The key values, in row order
    pub fn index(&self) -> &[f64] {
        &self.index
    }

    /// The accumulated metric frame (suffixed columns only)
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Joined names, in insertion order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
