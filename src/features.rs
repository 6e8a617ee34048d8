//! Derived columns computed from the physicochemical measurements.
//!
//! Every [`DerivedFeature`] is a fixed arithmetic formula over source columns.
//! The ratios divide by measured quantities that can be zero (residual sugar,
//! total sulfur dioxide), so a [`NonFinitePolicy`] decides what happens when a
//! derived value comes out `NaN` or infinite.
//!
//! Features must be derived on the full table before it is partitioned so that
//! every partition sees identical definitions.

use crate::acquire::QUALITY_COLUMN;
use crate::error::WrangleError;
use crate::frame::{Column, Frame};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A derived numeric column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedFeature {
    /// `fixed_acidity + volatile_acidity + citric_acid`
    TotalAcidity,
    /// `free_sulfur_dioxide / total_sulfur_dioxide`
    SulfurDioxideRatio,
    /// `ph / total_acidity`
    PhToAcidityRatio,
    /// `alcohol * density`
    AlcoholByDensity,
    /// `chlorides / residual_sugar`
    ChloridesByResidualSugar,
    /// `(2 * free_sulfur_dioxide + total_sulfur_dioxide) / 3`
    SulfurDioxideIndex,
}

impl DerivedFeature {
    /// Every feature, in the order the exploration introduced them.
    pub const ALL: [DerivedFeature; 6] = [
        DerivedFeature::TotalAcidity,
        DerivedFeature::SulfurDioxideRatio,
        DerivedFeature::PhToAcidityRatio,
        DerivedFeature::AlcoholByDensity,
        DerivedFeature::ChloridesByResidualSugar,
        DerivedFeature::SulfurDioxideIndex,
    ];

    /// Output column name.
    pub fn name(self) -> &'static str {
        match self {
            DerivedFeature::TotalAcidity => "total_acidity",
            DerivedFeature::SulfurDioxideRatio => "sulfur_dioxide_ratio",
            DerivedFeature::PhToAcidityRatio => "ph_to_acidity_ratio",
            DerivedFeature::AlcoholByDensity => "alcohol_by_density",
            DerivedFeature::ChloridesByResidualSugar => "chlorides_by_residual_sugar",
            DerivedFeature::SulfurDioxideIndex => "sulfur_dioxide_index",
        }
    }

    /// Compute the feature's values for every row.
    pub fn compute(self, frame: &Frame) -> Result<Vec<f64>, WrangleError> {
        match self {
            DerivedFeature::TotalAcidity => total_acidity(frame),
            DerivedFeature::SulfurDioxideRatio => binary(
                frame,
                "free_sulfur_dioxide",
                "total_sulfur_dioxide",
                |a, b| a / b,
            ),
            DerivedFeature::PhToAcidityRatio => {
                // Read the derived column when present so the ratio does not
                // depend on the order features are requested in.
                let acidity = match frame.numeric(DerivedFeature::TotalAcidity.name()) {
                    Ok(values) => values.to_vec(),
                    Err(WrangleError::ColumnNotFound(_)) => total_acidity(frame)?,
                    Err(e) => return Err(e),
                };
                let ph = frame.numeric("ph")?;
                Ok(ph.iter().zip(&acidity).map(|(p, a)| p / a).collect())
            }
            DerivedFeature::AlcoholByDensity => binary(frame, "alcohol", "density", |a, b| a * b),
            DerivedFeature::ChloridesByResidualSugar => {
                binary(frame, "chlorides", "residual_sugar", |a, b| a / b)
            }
            DerivedFeature::SulfurDioxideIndex => binary(
                frame,
                "free_sulfur_dioxide",
                "total_sulfur_dioxide",
                |free, total| (2.0 * free + total) / 3.0,
            ),
        }
    }
}

fn total_acidity(frame: &Frame) -> Result<Vec<f64>, WrangleError> {
    let fixed = frame.numeric("fixed_acidity")?;
    let volatile = frame.numeric("volatile_acidity")?;
    let citric = frame.numeric("citric_acid")?;
    Ok(fixed
        .iter()
        .zip(volatile)
        .zip(citric)
        .map(|((f, v), c)| f + v + c)
        .collect())
}

fn binary<F: Fn(f64, f64) -> f64>(
    frame: &Frame,
    left: &str,
    right: &str,
    op: F,
) -> Result<Vec<f64>, WrangleError> {
    let a = frame.numeric(left)?;
    let b = frame.numeric(right)?;
    Ok(a.iter().zip(b).map(|(&x, &y)| op(x, y)).collect())
}

/// What to do when a derived column contains `NaN` or infinite values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonFinitePolicy {
    /// Keep the values without comment.
    Allow,
    /// Keep the values and log a warning with the count.
    #[default]
    Warn,
    /// Fail with [`WrangleError::NonFiniteValues`].
    Error,
}

/// Add the requested derived columns to a copy of `frame`.
///
/// Requesting the same feature twice computes it once.
pub fn engineer_features(
    frame: &Frame,
    features: &[DerivedFeature],
    policy: NonFinitePolicy,
) -> Result<Frame, WrangleError> {
    let mut out = frame.clone();
    let mut done = HashSet::new();
    for &feature in features {
        if !done.insert(feature) {
            continue;
        }
        // Computed against the input frame so results do not depend on order.
        let values = feature.compute(frame)?;
        let bad = values.iter().filter(|v| !v.is_finite()).count();
        if bad > 0 {
            match policy {
                NonFinitePolicy::Allow => {}
                NonFinitePolicy::Warn => tracing::warn!(
                    feature = feature.name(),
                    count = bad,
                    "derived feature has non-finite values"
                ),
                NonFinitePolicy::Error => {
                    return Err(WrangleError::NonFiniteValues {
                        column: feature.name().to_string(),
                        count: bad,
                    })
                }
            }
        }
        out.set_column(feature.name(), Column::Numeric(values))?;
    }
    tracing::debug!(added = done.len(), "engineered features");
    Ok(out)
}

/// Column written by [`bin_quality`].
pub const QUALITY_BINS_COLUMN: &str = "quality_bins";

/// Label for a quality score using right-closed bins
/// `(3, 5]` Low, `(5, 6]` Med, `(6, 9]` High.
///
/// Scores outside `(3, 9]` get `"Unbinned"`.
pub fn quality_bin(quality: f64) -> &'static str {
    if quality > 3.0 && quality <= 5.0 {
        "Low"
    } else if quality > 5.0 && quality <= 6.0 {
        "Med"
    } else if quality > 6.0 && quality <= 9.0 {
        "High"
    } else {
        "Unbinned"
    }
}

/// Add a categorical `quality_bins` column.
pub fn bin_quality(frame: &Frame) -> Result<Frame, WrangleError> {
    let bins = frame
        .numeric(QUALITY_COLUMN)?
        .iter()
        .map(|&q| quality_bin(q).to_string())
        .collect();
    let mut out = frame.clone();
    out.set_column(QUALITY_BINS_COLUMN, Column::Categorical(bins))?;
    Ok(out)
}

/// Numeric columns with more than `min_unique` distinct values.
pub fn continuous_columns(frame: &Frame, min_unique: usize) -> Vec<String> {
    frame
        .iter()
        .filter_map(|(name, column)| {
            let values = column.as_numeric()?;
            let distinct: HashSet<u64> = values.iter().map(|v| v.to_bits()).collect();
            (distinct.len() > min_unique).then(|| name.to_string())
        })
        .collect()
}
