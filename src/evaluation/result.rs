//! Scored test outcomes and threshold-adjustable metrics

use crate::error::{Result, TabError};
use polars::prelude::*;

/// The metric bundle produced by [`PredictionResult::as_series`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub auc: f64,
}

/// One model's outcome on one test table.
///
/// Rows are kept sorted by descending score whenever a score is present, so
/// threshold reclassification is a rank cutoff. `with_threshold` derives a
/// reinterpreted view; the underlying rows never change.
#[derive(Debug, Clone)]
pub struct PredictionResult {
    actual: Vec<f64>,
    predicted: Vec<f64>,
    score: Option<Vec<f64>>,
    threshold: Option<f64>,
}

impl PredictionResult {
    /// Build a result from parallel actual/predicted vectors and an optional
    /// ranking score. Sorts by descending score (stable) when one is given.
    pub fn new(actual: Vec<f64>, predicted: Vec<f64>, score: Option<Vec<f64>>) -> Result<Self> {
        if predicted.len() != actual.len() {
            return Err(TabError::ShapeError {
                expected: format!("{} predictions", actual.len()),
                actual: format!("{} predictions", predicted.len()),
            });
        }
        if let Some(ref s) = score {
            if s.len() != actual.len() {
                return Err(TabError::ShapeError {
                    expected: format!("{} scores", actual.len()),
                    actual: format!("{} scores", s.len()),
                });
            }
        }

        let (actual, predicted, score) = match score {
            Some(s) => {
                let mut order: Vec<usize> = (0..actual.len()).collect();
                order.sort_by(|&a, &b| {
                    s[b].partial_cmp(&s[a]).unwrap_or(std::cmp::Ordering::Equal)
                });
                let actual = order.iter().map(|&i| actual[i]).collect();
                let predicted = order.iter().map(|&i| predicted[i]).collect();
                let score = order.iter().map(|&i| s[i]).collect();
                (actual, predicted, Some(score))
            }
            None => (actual, predicted, None),
        };

        Ok(Self {
            actual,
            predicted,
            score,
            threshold: None,
        })
    }

    /// Reinterpret predictions under a threshold percentage: the top
    /// `floor(N * t / 100)` rows by score rank become positive.
    pub fn with_threshold(&self, threshold: f64) -> Result<Self> {
        if self.score.is_none() {
            return Err(TabError::ValidationError(
                "cannot apply a threshold to a result without ranking scores".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&threshold) {
            return Err(TabError::ConfigError(format!(
                "threshold must be in [0, 100], got {}",
                threshold
            )));
        }

        let mut result = self.clone();
        result.threshold = Some(threshold);
        Ok(result)
    }

    /// The threshold in effect, if any
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Effective predicted labels: the model's own predictions, or the rank
    /// cutoff when a threshold is set.
    pub fn predictions(&self) -> Vec<f64> {
        match self.threshold {
            None => self.predicted.clone(),
            Some(t) => {
                let n = self.actual.len();
                let n_positive = (n as f64 * t / 100.0).floor() as usize;
                (0..n)
                    .map(|i| if i < n_positive { 1.0 } else { 0.0 })
                    .collect()
            }
        }
    }

    /// Fraction of rows whose actual label is positive. Threshold-independent.
    pub fn baseline(&self) -> f64 {
        if self.actual.is_empty() {
            return f64::NAN;
        }
        let positives = self.actual.iter().filter(|&&a| a == 1.0).count();
        positives as f64 / self.actual.len() as f64
    }

    fn counts(&self) -> (f64, f64, f64, f64) {
        let predictions = self.predictions();
        let mut tp = 0.0;
        let mut tn = 0.0;
        let mut fp = 0.0;
        let mut fn_ = 0.0;
        for (&a, &p) in self.actual.iter().zip(predictions.iter()) {
            match (a == 1.0, p == 1.0) {
                (true, true) => tp += 1.0,
                (false, false) => tn += 1.0,
                (false, true) => fp += 1.0,
                (true, false) => fn_ += 1.0,
            }
        }
        (tp, tn, fp, fn_)
    }

    pub fn accuracy(&self) -> f64 {
        let (tp, tn, fp, fn_) = self.counts();
        let total = tp + tn + fp + fn_;
        if total == 0.0 {
            return f64::NAN;
        }
        (tp + tn) / total
    }

    /// Precision; 0 when nothing is predicted positive
    pub fn precision(&self) -> f64 {
        let (tp, _, fp, _) = self.counts();
        if tp + fp == 0.0 {
            return 0.0;
        }
        tp / (tp + fp)
    }

    /// Recall; 0 when nothing is actually positive
    pub fn recall(&self) -> f64 {
        let (tp, _, _, fn_) = self.counts();
        if tp + fn_ == 0.0 {
            return 0.0;
        }
        tp / (tp + fn_)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    /// Rank-based ROC AUC with average ranks for ties.
    ///
    /// Uses the score when present, the point predictions otherwise. NaN when
    /// only one class appears.
    pub fn auc(&self) -> f64 {
        let ranking: &[f64] = match &self.score {
            Some(s) => s,
            None => &self.predicted,
        };

        let n = self.actual.len();
        let n_pos = self.actual.iter().filter(|&&a| a == 1.0).count();
        let n_neg = n - n_pos;
        if n_pos == 0 || n_neg == 0 {
            return f64::NAN;
        }

        // Average ranks (1-based) over the ascending score order
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            ranking[a]
                .partial_cmp(&ranking[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut ranks = vec![0.0f64; n];
        let mut i = 0;
        while i < n {
            let mut j = i;
            while j + 1 < n && ranking[order[j + 1]] == ranking[order[i]] {
                j += 1;
            }
            let avg_rank = (i + 1 + j + 1) as f64 / 2.0;
            for &idx in &order[i..=j] {
                ranks[idx] = avg_rank;
            }
            i = j + 1;
        }

        let rank_sum_pos: f64 = self
            .actual
            .iter()
            .zip(ranks.iter())
            .filter(|(&a, _)| a == 1.0)
            .map(|(_, &r)| r)
            .sum();

        let n_pos = n_pos as f64;
        let n_neg = n_neg as f64;
        (rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg)
    }

    /// 2x2 confusion matrix with an `actual` label column and
    /// `negative`/`positive` prediction columns.
    pub fn confusion_matrix(&self) -> Result<DataFrame> {
        let (tp, tn, fp, fn_) = self.counts();
        let df = df!(
            "actual" => &["false", "true"],
            "negative" => &[tn as i64, fn_ as i64],
            "positive" => &[fp as i64, tp as i64],
        )?;
        Ok(df)
    }

    /// All ratio metrics at once, for aggregation
    pub fn as_series(&self) -> MetricSummary {
        MetricSummary {
            accuracy: self.accuracy(),
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
            auc: self.auc(),
        }
    }

    /// The underlying rows as a table with `actual`, `predict`, and (when
    /// present) `score` columns, in rank order.
    pub fn frame(&self) -> Result<DataFrame> {
        let mut columns = vec![
            Column::new("actual".into(), self.actual.clone()),
            Column::new("predict".into(), self.predicted.clone()),
        ];
        if let Some(ref s) = self.score {
            columns.push(Column::new("score".into(), s.clone()));
        }
        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored_result() -> PredictionResult {
        // Three actual positives carry the three highest scores
        let actual = vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let predicted = vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let score = vec![0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.15, 0.1];
        PredictionResult::new(actual, predicted, Some(score)).unwrap()
    }

    #[test]
    fn test_perfect_metrics() {
        let result = scored_result();
        assert_eq!(result.accuracy(), 1.0);
        assert_eq!(result.precision(), 1.0);
        assert_eq!(result.recall(), 1.0);
        assert_eq!(result.f1(), 1.0);
        assert_eq!(result.auc(), 1.0);
        assert!((result.baseline() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_cutoff_matches_prevalence() {
        let result = scored_result().with_threshold(30.0).unwrap();
        // top 3 of 10 predicted positive, exactly the actual positives
        assert_eq!(result.accuracy(), 1.0);
        assert_eq!(result.predictions().iter().sum::<f64>(), 3.0);
    }

    #[test]
    fn test_threshold_extremes() {
        let result = scored_result();

        let all = result.with_threshold(100.0).unwrap();
        assert!(all.predictions().iter().all(|&p| p == 1.0));
        assert_eq!(all.recall(), 1.0);
        assert!((all.precision() - 0.3).abs() < 1e-12);

        let none = result.with_threshold(0.0).unwrap();
        assert!(none.predictions().iter().all(|&p| p == 0.0));
        assert_eq!(none.precision(), 0.0);
        assert_eq!(none.recall(), 0.0);
    }

    #[test]
    fn test_threshold_does_not_mutate() {
        let result = scored_result();
        let _ = result.with_threshold(50.0).unwrap();
        assert!(result.threshold().is_none());
        assert_eq!(result.accuracy(), 1.0);
    }

    #[test]
    fn test_threshold_without_score_rejected() {
        let result =
            PredictionResult::new(vec![1.0, 0.0], vec![1.0, 0.0], None).unwrap();
        assert!(matches!(
            result.with_threshold(50.0).unwrap_err(),
            TabError::ValidationError(_)
        ));
    }

    #[test]
    fn test_auc_single_class_is_nan() {
        let result =
            PredictionResult::new(vec![1.0, 1.0], vec![1.0, 0.0], Some(vec![0.9, 0.1]))
                .unwrap();
        assert!(result.auc().is_nan());
    }

    #[test]
    fn test_auc_with_ties() {
        // Tied scores get the average rank; one pos above, one tied pair
        let actual = vec![1.0, 1.0, 0.0, 0.0];
        let predicted = vec![1.0, 1.0, 0.0, 0.0];
        let score = vec![0.9, 0.5, 0.5, 0.1];
        let result = PredictionResult::new(actual, predicted, Some(score)).unwrap();
        // pos ranks: 4 and 2.5 -> (6.5 - 3) / 4 = 0.875
        assert!((result.auc() - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_confusion_matrix_layout() {
        let actual = vec![1.0, 1.0, 0.0, 0.0, 0.0];
        let predicted = vec![1.0, 0.0, 1.0, 0.0, 0.0];
        let result = PredictionResult::new(actual, predicted, None).unwrap();

        let cm = result.confusion_matrix().unwrap();
        assert_eq!(cm.height(), 2);
        let negatives = crate::utils::column_f64(&cm, "negative").unwrap();
        let positives = crate::utils::column_f64(&cm, "positive").unwrap();
        assert_eq!(negatives, vec![2.0, 1.0]); // tn, fn
        assert_eq!(positives, vec![1.0, 1.0]); // fp, tp
    }

    #[test]
    fn test_frame_rows_in_rank_order() {
        // Rows given out of order come back sorted by descending score
        let actual = vec![0.0, 1.0, 0.0, 1.0];
        let predicted = vec![0.0, 1.0, 0.0, 1.0];
        let score = vec![0.2, 0.9, 0.1, 0.6];
        let result = PredictionResult::new(actual, predicted, Some(score)).unwrap();

        let frame = result.frame().unwrap();
        assert_eq!(
            crate::utils::column_f64(&frame, "score").unwrap(),
            vec![0.9, 0.6, 0.2, 0.1]
        );
        assert_eq!(
            crate::utils::column_f64(&frame, "actual").unwrap(),
            vec![1.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_frame_omits_score_when_absent() {
        let result = PredictionResult::new(vec![1.0, 0.0], vec![1.0, 0.0], None).unwrap();
        let frame = result.frame().unwrap();
        assert_eq!(frame.width(), 2);
        assert!(frame.column("score").is_err());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = PredictionResult::new(vec![1.0], vec![1.0, 0.0], None).unwrap_err();
        assert!(matches!(err, TabError::ShapeError { .. }));
    }
}
