//! Min-Max Scaler.
//!
//! Transforms selected columns by scaling each to a given range (default [0, 1]).
//!
//! The transformation is given by:
//! ```text
//! X_scaled = (X - X_min) / (X_max - X_min) * (max - min) + min
//! ```
//!
//! `X_min` and `X_max` come from the frame passed to `fit` only. Fit on the
//! training partition and reuse the fitted value for validation and test;
//! values outside the training range map outside the target range.
//!
//! # Example
//! ```ignore
//! use wine_wrangle::preprocessing::{FittedTransformer, MinMaxScaler, Transformer};
//!
//! let scaler = MinMaxScaler::new().with_range(0.0, 1.0);
//! let fitted = scaler.fit(&train)?;
//! let scaled_test = fitted.transform(&test)?;
//! ```

use super::{map_columns, nan_min_max, ColumnSelection};
use crate::error::WrangleError;
use crate::frame::Frame;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

/// Configuration for MinMaxScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerConfig {
    /// Minimum value of the target range.
    pub min: f64,
    /// Maximum value of the target range.
    pub max: f64,
}

impl Default for MinMaxScalerConfig {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Serializable parameters for a fitted MinMaxScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerParams {
    /// Configuration options.
    pub config: MinMaxScalerConfig,
    /// Scaled column names, in fit order.
    pub columns: Vec<String>,
    /// Minimum of each column.
    pub min_: Vec<f64>,
    /// Maximum of each column.
    pub max_: Vec<f64>,
    /// Scale factor for each column: (max - min) / (column_max - column_min).
    pub scale_: Vec<f64>,
}

/// MinMaxScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct MinMaxScaler {
    config: MinMaxScalerConfig,
    selection: ColumnSelection,
}

impl MinMaxScaler {
    /// Create a new MinMaxScaler with default range [0, 1] over all numeric columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target range for scaling.
    ///
    /// # Panics
    /// Panics if `max <= min`.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        assert!(max > min, "max must be greater than min");
        self.config.min = min;
        self.config.max = max;
        self
    }

    /// Set which columns are scaled.
    pub fn with_columns(mut self, selection: ColumnSelection) -> Self {
        self.selection = selection;
        self
    }
}

impl Transformer for MinMaxScaler {
    type Fitted = FittedMinMaxScaler;

    fn fit(&self, data: &Frame) -> Result<Self::Fitted, WrangleError> {
        if data.is_empty() {
            return Err(WrangleError::EmptyData(
                "Cannot fit MinMaxScaler on empty data".to_string(),
            ));
        }

        let columns = self.selection.resolve(data)?;
        let target_range = self.config.max - self.config.min;

        let mut min_ = Vec::with_capacity(columns.len());
        let mut max_ = Vec::with_capacity(columns.len());
        let mut scale_ = Vec::with_capacity(columns.len());
        for name in &columns {
            let (lo, hi) = nan_min_max(data.numeric(name)?).ok_or_else(|| {
                WrangleError::MissingValues(format!("column {} has no finite values", name))
            })?;
            let range = hi - lo;
            min_.push(lo);
            max_.push(hi);
            // Constant column: scale by 1 to avoid division by zero
            scale_.push(if range == 0.0 { 1.0 } else { target_range / range });
        }

        tracing::debug!(columns = columns.len(), rows = data.n_rows(), "fitted MinMaxScaler");
        Ok(FittedMinMaxScaler {
            config: self.config.clone(),
            columns,
            min_,
            max_,
            scale_,
        })
    }
}

/// Fitted MinMaxScaler ready for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedMinMaxScaler {
    config: MinMaxScalerConfig,
    columns: Vec<String>,
    min_: Vec<f64>,
    max_: Vec<f64>,
    scale_: Vec<f64>,
}

impl FittedMinMaxScaler {
    /// Names of the scaled columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Minimum of each column seen during fit.
    pub fn min(&self) -> &[f64] {
        &self.min_
    }

    /// Maximum of each column seen during fit.
    pub fn max(&self) -> &[f64] {
        &self.max_
    }

    /// Scale factor for each column.
    pub fn scale(&self) -> &[f64] {
        &self.scale_
    }

    /// Data range (max - min) for each column.
    pub fn data_range(&self) -> Vec<f64> {
        self.max_
            .iter()
            .zip(&self.min_)
            .map(|(hi, lo)| hi - lo)
            .collect()
    }
}

impl FittedTransformer for FittedMinMaxScaler {
    type Params = MinMaxScalerParams;

    fn transform(&self, data: &Frame) -> Result<Frame, WrangleError> {
        // X_scaled = (X - X_min) * scale_ + target_min
        map_columns(data, &self.columns, |i, values| {
            values
                .iter()
                .map(|&x| (x - self.min_[i]) * self.scale_[i] + self.config.min)
                .collect()
        })
    }

    fn inverse_transform(&self, data: &Frame) -> Result<Frame, WrangleError> {
        // X = (X_scaled - target_min) / scale_ + X_min
        map_columns(data, &self.columns, |i, values| {
            values
                .iter()
                .map(|&x| (x - self.config.min) / self.scale_[i] + self.min_[i])
                .collect()
        })
    }

    fn extract_params(&self) -> Self::Params {
        MinMaxScalerParams {
            config: self.config.clone(),
            columns: self.columns.clone(),
            min_: self.min_.clone(),
            max_: self.max_.clone(),
            scale_: self.scale_.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, WrangleError> {
        let n = params.columns.len();
        for got in [params.min_.len(), params.max_.len(), params.scale_.len()] {
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
            min_: params.min_,
            max_: params.max_,
            scale_: params.scale_,
        })
    }

    fn n_features_in(&self) -> usize {
        self.columns.len()
    }
}
