//! Regression metrics and a mean baseline.

use crate::error::WrangleError;
use serde::{Deserialize, Serialize};

/// Error scores of a set of predictions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean squared error: mean((y_true - y_pred)^2).
    pub mse: f64,
    /// Square root of the MSE, in target units.
    pub rmse: f64,
    /// Mean absolute error: mean(|y_true - y_pred|).
    pub mae: f64,
    /// Coefficient of determination: 1 - SS_res / SS_tot.
    ///
    /// `0.0` when the targets are constant.
    pub r2: f64,
}

impl RegressionMetrics {
    /// Score `y_pred` against `y_true`.
    ///
    /// # Errors
    /// - `FeatureMismatch` if the slices differ in length
    /// - `EmptyData` if they are empty
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self, WrangleError> {
        if y_true.len() != y_pred.len() {
            return Err(WrangleError::FeatureMismatch {
                expected_features: y_true.len(),
                got_features: y_pred.len(),
            });
        }
        if y_true.is_empty() {
            return Err(WrangleError::EmptyData(
                "Cannot score empty predictions".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let mut ss_res = 0.0;
        let mut abs = 0.0;
        for (&t, &p) in y_true.iter().zip(y_pred) {
            ss_res += (t - p).powi(2);
            abs += (t - p).abs();
        }

        let mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean).powi(2)).sum();

        let mse = ss_res / n;
        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae: abs / n,
            r2: if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot },
        })
    }
}

/// Predicts the mean of the values it was fitted on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeanBaseline {
    pub mean: f64,
}

impl MeanBaseline {
    /// Constant prediction for `n` rows.
    pub fn predict(&self, n: usize) -> Vec<f64> {
        vec![self.mean; n]
    }

    /// Score the baseline on `y_true`.
    pub fn score(&self, y_true: &[f64]) -> Result<RegressionMetrics, WrangleError> {
        RegressionMetrics::compute(y_true, &self.predict(y_true.len()))
    }
}

/// Baseline predicting the mean of `train_target`.
pub fn mean_baseline(train_target: &[f64]) -> Result<MeanBaseline, WrangleError> {
    if train_target.is_empty() {
        return Err(WrangleError::EmptyData(
            "Cannot fit a baseline on an empty target".to_string(),
        ));
    }
    Ok(MeanBaseline {
        mean: train_target.iter().sum::<f64>() / train_target.len() as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_perfect_prediction() {
        let y = [5.0, 6.0, 7.0];
        let m = RegressionMetrics::compute(&y, &y).unwrap();
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_metrics_values() {
        let y_true = [3.0, 5.0, 7.0];
        let y_pred = [4.0, 5.0, 5.0];
        let m = RegressionMetrics::compute(&y_true, &y_pred).unwrap();
        assert!((m.mse - 5.0 / 3.0).abs() < 1e-12);
        assert!((m.rmse - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((m.mae - 1.0).abs() < 1e-12);
        // ss_tot = 8, ss_res = 5
        assert!((m.r2 - (1.0 - 5.0 / 8.0)).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_length_mismatch() {
        assert!(matches!(
            RegressionMetrics::compute(&[1.0], &[1.0, 2.0]),
            Err(WrangleError::FeatureMismatch { .. })
        ));
        assert!(matches!(
            RegressionMetrics::compute(&[], &[]),
            Err(WrangleError::EmptyData(_))
        ));
    }

    #[test]
    fn test_mean_baseline() {
        let baseline = mean_baseline(&[5.0, 6.0, 7.0]).unwrap();
        assert_eq!(baseline.mean, 6.0);
        let m = baseline.score(&[6.0, 6.0]).unwrap();
        assert_eq!(m.mse, 0.0);
        // constant targets
        assert_eq!(m.r2, 0.0);

        let m = baseline.score(&[5.0, 7.0]).unwrap();
        assert_eq!(m.r2, 0.0);
        assert_eq!(m.mae, 1.0);
    }
}
