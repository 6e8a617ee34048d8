//! Standard Scaler (Z-score normalization).
//!
//! Transforms selected columns by removing the mean and scaling to unit variance:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the fit data and `s` its population standard
//! deviation. `NaN` cells are skipped when computing both.

use super::{map_columns, ColumnSelection};
use crate::error::WrangleError;
use crate::frame::Frame;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

/// Configuration for StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// If true, center the data before scaling.
    pub with_mean: bool,
    /// If true, scale the data to unit variance.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    pub config: StandardScalerConfig,
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    config: StandardScalerConfig,
    selection: ColumnSelection,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to center the data.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    /// Set whether to scale to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }

    /// Set which columns are scaled.
    pub fn with_columns(mut self, selection: ColumnSelection) -> Self {
        self.selection = selection;
        self
    }
}

impl Transformer for StandardScaler {
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Frame) -> Result<Self::Fitted, WrangleError> {
        if data.is_empty() {
            return Err(WrangleError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let columns = self.selection.resolve(data)?;
        let mut mean = Vec::with_capacity(columns.len());
        let mut std = Vec::with_capacity(columns.len());

        for name in &columns {
            let present: Vec<f64> = data
                .numeric(name)?
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .collect();
            if present.is_empty() {
                return Err(WrangleError::MissingValues(format!(
                    "column {} has no finite values",
                    name
                )));
            }
            let n = present.len() as f64;
            let m = present.iter().sum::<f64>() / n;
            let var = present.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
            let s = var.sqrt();

            mean.push(if self.config.with_mean { m } else { 0.0 });
            // Zero variance: leave the column unscaled
            std.push(if self.config.with_std && s > 0.0 { s } else { 1.0 });
        }

        tracing::debug!(columns = columns.len(), rows = data.n_rows(), "fitted StandardScaler");
        Ok(FittedStandardScaler {
            config: self.config.clone(),
            columns,
            mean,
            std,
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedStandardScaler {
    config: StandardScalerConfig,
    columns: Vec<String>,
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl FittedStandardScaler {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Mean of each column (zeros if `with_mean` is false).
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Standard deviation of each column (ones if `with_std` is false).
    pub fn std(&self) -> &[f64] {
        &self.std
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Params = StandardScalerParams;

    fn transform(&self, data: &Frame) -> Result<Frame, WrangleError> {
        map_columns(data, &self.columns, |i, values| {
            values
                .iter()
                .map(|&x| (x - self.mean[i]) / self.std[i])
                .collect()
        })
    }

    fn inverse_transform(&self, data: &Frame) -> Result<Frame, WrangleError> {
        map_columns(data, &self.columns, |i, values| {
            values
                .iter()
                .map(|&z| z * self.std[i] + self.mean[i])
                .collect()
        })
    }

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            config: self.config.clone(),
            columns: self.columns.clone(),
            mean: self.mean.clone(),
            std: self.std.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, WrangleError> {
        let n = params.columns.len();
        for got in [params.mean.len(), params.std.len()] {
            if got != n {
                return Err(WrangleError::FeatureMismatch {
                    expected_features: n,
                    got_features: got,
                });
            }
        }
        Ok(Self {
            config: params.config,
            columns: params.columns,
            mean: params.mean,
            std: params.std,
        })
    }

    fn n_features_in(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    fn data() -> Frame {
        Frame::new(vec![
            ("a".to_string(), Column::Numeric(vec![1.0, 2.0, 3.0])),
            ("b".to_string(), Column::Numeric(vec![4.0, 4.0, 4.0])),
        ])
        .unwrap()
    }

    #[test]
    fn test_standard_scaler_fit() {
        let fitted = StandardScaler::new().fit(&data()).unwrap();
        assert_eq!(fitted.mean(), &[2.0, 4.0]);
        let expected_std = (2.0f64 / 3.0).sqrt();
        assert!((fitted.std()[0] - expected_std).abs() < 1e-12);
        // constant column
        assert_eq!(fitted.std()[1], 1.0);
    }

    #[test]
    fn test_standard_scaler_transform_zero_mean() {
        let out = StandardScaler::new().fit_transform(&data()).unwrap();
        let a = out.numeric("a").unwrap();
        assert!(a.iter().sum::<f64>().abs() < 1e-12);
        assert_eq!(out.numeric("b").unwrap(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_standard_scaler_without_mean() {
        let fitted = StandardScaler::new().with_mean(false).fit(&data()).unwrap();
        assert_eq!(fitted.mean(), &[0.0, 0.0]);
    }

    #[test]
    fn test_standard_scaler_inverse_transform() {
        let d = data();
        let fitted = StandardScaler::new().fit(&d).unwrap();
        let back = fitted
            .inverse_transform(&fitted.transform(&d).unwrap())
            .unwrap();
        for (o, r) in d.numeric("a").unwrap().iter().zip(back.numeric("a").unwrap()) {
            assert!((o - r).abs() < 1e-12);
        }
    }

    #[test]
    fn test_standard_scaler_params_roundtrip() {
        let fitted = StandardScaler::new().fit(&data()).unwrap();
        let restored = FittedStandardScaler::from_params(fitted.extract_params()).unwrap();
        assert_eq!(restored, fitted);
    }

    #[test]
    fn test_standard_scaler_all_nan_column() {
        let d = Frame::new(vec![("a".to_string(), Column::Numeric(vec![f64::NAN]))]).unwrap();
        assert!(matches!(
            StandardScaler::new().fit(&d),
            Err(WrangleError::MissingValues(_))
        ));
    }
}
