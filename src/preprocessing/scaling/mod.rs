//! Scaling transformers for numeric columns.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`MinMaxScaler`] | Scale to [0, 1] or a custom range |
//! | [`StandardScaler`] | Z-score normalization (mean=0, std=1) |
//!
//! Both operate on named columns of a [`Frame`]; a [`ColumnSelection`] decides
//! which ones at fit time. Columns outside the selection pass through.

pub mod minmax;
pub mod standard;

pub use minmax::{FittedMinMaxScaler, MinMaxScaler, MinMaxScalerConfig, MinMaxScalerParams};
pub use standard::{FittedStandardScaler, StandardScaler, StandardScalerParams};

use crate::error::WrangleError;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};

/// Which columns a scaler is fitted on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSelection {
    /// Exactly these columns; each must exist and be numeric.
    Named(Vec<String>),
    /// Every numeric column except these.
    AllNumericExcept(Vec<String>),
}

impl Default for ColumnSelection {
    fn default() -> Self {
        ColumnSelection::AllNumericExcept(Vec::new())
    }
}

impl ColumnSelection {
    /// Resolve to concrete column names against `frame`.
    pub fn resolve(&self, frame: &Frame) -> Result<Vec<String>, WrangleError> {
        match self {
            ColumnSelection::Named(names) => {
                for name in names {
                    frame.numeric(name)?;
                }
                Ok(names.clone())
            }
            ColumnSelection::AllNumericExcept(excluded) => Ok(frame
                .numeric_names()
                .into_iter()
                .filter(|n| !excluded.contains(n))
                .collect()),
        }
    }
}

/// Apply `f` to each selected numeric column of a copy of `data`.
pub(crate) fn map_columns<F>(
    data: &Frame,
    columns: &[String],
    mut f: F,
) -> Result<Frame, WrangleError>
where
    F: FnMut(usize, &[f64]) -> Vec<f64>,
{
    let mut out = data.clone();
    for (i, name) in columns.iter().enumerate() {
        let values = f(i, data.numeric(name)?);
        out.set_column(name, crate::frame::Column::Numeric(values))?;
    }
    Ok(out)
}

/// Min and max ignoring `NaN`; `None` when every value is `NaN`.
pub(crate) fn nan_min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
