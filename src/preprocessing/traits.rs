//! Core traits for preprocessing transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; has hyperparameters and can learn from data.
//! - [`FittedTransformer`]: After fitting; holds learned parameters, transforms
//!   any frame with them and can be serialized.
//!
//! Keeping the fitted state in its own value is what lets the pipeline fit on
//! the training partition once and apply exactly the same parameters to the
//! validation and test partitions.

use crate::error::WrangleError;
use crate::frame::Frame;
use crate::serialization::{read_params, write_params, SerializableParams};

/// Trait for unfitted transformers with hyperparameters.
///
/// # Example
/// ```ignore
/// use wine_wrangle::preprocessing::{FittedTransformer, MinMaxScaler, Transformer};
///
/// let scaler = MinMaxScaler::new();
/// let fitted = scaler.fit(&train)?;
/// let scaled_val = fitted.transform(&validate)?;
/// ```
pub trait Transformer: Clone {
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer;

    /// Learn parameters from `data`.
    ///
    /// # Errors
    /// Returns [`WrangleError`] if:
    /// - Data is empty
    /// - A required column is missing or has the wrong kind
    fn fit(&self, data: &Frame) -> Result<Self::Fitted, WrangleError>;

    /// Fit and transform the same data in one step.
    fn fit_transform(&self, data: &Frame) -> Result<Frame, WrangleError> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
/// - `save_to_file` / `load_from_file` are cross-platform compatible.
pub trait FittedTransformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Transform data using learned parameters.
    ///
    /// Columns the transformer was not fitted on pass through unchanged.
    fn transform(&self, data: &Frame) -> Result<Frame, WrangleError>;

    /// Reverse the transformation.
    fn inverse_transform(&self, data: &Frame) -> Result<Frame, WrangleError>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self, WrangleError>
    where
        Self: Sized;

    /// Save the fitted transformer to a file.
    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), WrangleError> {
        write_params(path, &self.extract_params())
    }

    /// Load a fitted transformer from a file.
    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, WrangleError>
    where
        Self: Sized,
    {
        Self::from_params(read_params(path)?)
    }

    /// Number of input columns seen during fit.
    fn n_features_in(&self) -> usize;
}
