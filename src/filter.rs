//! Row filtering by inclusive upper bounds.

use crate::error::WrangleError;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};

/// Keep rows where `column <= max`.
///
/// `NaN` never satisfies the predicate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub column: String,
    pub max: f64,
}

impl RangeFilter {
    pub fn at_most(column: impl Into<String>, max: f64) -> Self {
        Self {
            column: column.into(),
            max,
        }
    }

    fn keeps(&self, frame: &Frame) -> Result<Vec<bool>, WrangleError> {
        Ok(frame
            .numeric(&self.column)?
            .iter()
            .map(|&v| v <= self.max)
            .collect())
    }
}

/// Bounds used to drop the implausible density and alcohol readings.
pub fn outlier_filters() -> Vec<RangeFilter> {
    vec![
        RangeFilter::at_most("density", 1.01),
        RangeFilter::at_most("alcohol", 14.04),
    ]
}

/// Keep the rows that satisfy every filter.
///
/// An empty filter list returns the frame unchanged.
pub fn apply_filters(frame: &Frame, filters: &[RangeFilter]) -> Result<Frame, WrangleError> {
    if filters.is_empty() {
        return Ok(frame.clone());
    }

    let mut mask = vec![true; frame.n_rows()];
    for filter in filters {
        for (keep, passes) in mask.iter_mut().zip(filter.keeps(frame)?) {
            *keep &= passes;
        }
    }

    let filtered = frame.filter_rows(&mask)?;
    tracing::info!(
        before = frame.n_rows(),
        after = filtered.n_rows(),
        filters = filters.len(),
        "applied range filters"
    );
    Ok(filtered)
}
