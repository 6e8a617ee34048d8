//! Separating a partition into features and target.

use crate::error::WrangleError;
use crate::frame::{Column, Frame};
use ndarray::{Array1, Array2};

/// A partition split into its feature columns and target vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Xy {
    /// Every column except the target, in their original order.
    pub features: Frame,
    pub target: Array1<f64>,
    pub target_name: String,
    /// Index the target column had in the partition.
    target_position: usize,
}

impl Xy {
    /// Feature columns as a dense matrix.
    ///
    /// # Errors
    /// `TypeMismatch` if a feature column is still categorical.
    pub fn features_array(&self) -> Result<Array2<f64>, WrangleError> {
        self.features.to_array()
    }

    pub fn n_samples(&self) -> usize {
        self.target.len()
    }

    pub fn feature_names(&self) -> &[String] {
        self.features.names()
    }

    /// Positions of these rows in the acquired table.
    pub fn row_ids(&self) -> &[usize] {
        self.features.row_ids()
    }

    /// Put the target back where it was, giving the partition `xy_split` saw.
    pub fn reassemble(&self) -> Result<Frame, WrangleError> {
        let mut frame = self.features.clone();
        frame.insert_column(
            self.target_position,
            &self.target_name,
            Column::Numeric(self.target.to_vec()),
        )?;
        Ok(frame)
    }
}

/// Split `frame` into features (every column but `target`) and the target vector.
///
/// # Errors
/// `ColumnNotFound` if `target` is absent, `TypeMismatch` if it is categorical.
pub fn xy_split(frame: &Frame, target: &str) -> Result<Xy, WrangleError> {
    let values = frame.numeric(target)?.to_vec();
    let target_position = frame
        .position(target)
        .ok_or_else(|| WrangleError::ColumnNotFound(target.to_string()))?;

    let mut features = frame.clone();
    features.remove_column(target)?;

    Ok(Xy {
        features,
        target: Array1::from(values),
        target_name: target.to_string(),
        target_position,
    })
}
