//! Preprocessing transformers.
//!
//! Every transformer follows the same two-step shape: an unfitted
//! [`Transformer`] holds options and learns from a [`Frame`](crate::frame::Frame),
//! producing a [`FittedTransformer`] that applies the learned parameters to any
//! frame and serializes them with bincode.
//!
//! | Module | Transformers |
//! |--------|--------------|
//! | [`scaling`] | [`MinMaxScaler`], [`StandardScaler`] |
//! | [`encoding`] | [`OneHotEncoder`] over a shared [`Vocabulary`] |

pub mod encoding;
pub mod scaling;
pub mod traits;

pub use encoding::{
    indicator_name, FittedOneHotEncoder, HandleUnknown, OneHotEncoder, OneHotEncoderParams,
    Vocabulary,
};
pub use scaling::{
    ColumnSelection, FittedMinMaxScaler, FittedStandardScaler, MinMaxScaler, MinMaxScalerConfig,
    MinMaxScalerParams, StandardScaler, StandardScalerParams,
};
pub use traits::{FittedTransformer, Transformer};

use crate::error::WrangleError;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};

/// A fitted scaler of either kind, as produced by the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum FittedScaler {
    MinMax(FittedMinMaxScaler),
    Standard(FittedStandardScaler),
}

/// Serializable form of [`FittedScaler`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FittedScalerParams {
    MinMax(MinMaxScalerParams),
    Standard(StandardScalerParams),
}

impl FittedScaler {
    /// Names of the scaled columns.
    pub fn columns(&self) -> &[String] {
        match self {
            FittedScaler::MinMax(s) => s.columns(),
            FittedScaler::Standard(s) => s.columns(),
        }
    }
}

impl FittedTransformer for FittedScaler {
    type Params = FittedScalerParams;

    fn transform(&self, data: &Frame) -> Result<Frame, WrangleError> {
        match self {
            FittedScaler::MinMax(s) => s.transform(data),
            FittedScaler::Standard(s) => s.transform(data),
        }
    }

    fn inverse_transform(&self, data: &Frame) -> Result<Frame, WrangleError> {
        match self {
            FittedScaler::MinMax(s) => s.inverse_transform(data),
            FittedScaler::Standard(s) => s.inverse_transform(data),
        }
    }

    fn extract_params(&self) -> Self::Params {
        match self {
            FittedScaler::MinMax(s) => FittedScalerParams::MinMax(s.extract_params()),
            FittedScaler::Standard(s) => FittedScalerParams::Standard(s.extract_params()),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, WrangleError> {
        Ok(match params {
            FittedScalerParams::MinMax(p) => {
                FittedScaler::MinMax(FittedMinMaxScaler::from_params(p)?)
            }
            FittedScalerParams::Standard(p) => {
                FittedScaler::Standard(FittedStandardScaler::from_params(p)?)
            }
        })
    }

    fn n_features_in(&self) -> usize {
        self.columns().len()
    }
}
