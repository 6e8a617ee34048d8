//! In-memory tabular data.
//!
//! A [`Frame`] is an ordered list of named, equal-length columns. Each column is
//! either numeric (`f64`, with `NaN` marking a missing cell) or categorical
//! (`String`). Every frame also carries a `row_ids` vector recording where each
//! row sat in the table it was derived from, so that partitions produced by the
//! splitter can always be traced back to the acquired table.
//!
//! # Example
//!
//! ```
//! use wine_wrangle::frame::{Column, Frame};
//!
//! let frame = Frame::new(vec![
//!     ("alcohol".to_string(), Column::Numeric(vec![9.0, 10.0])),
//!     ("type".to_string(), Column::Categorical(vec!["red".into(), "white".into()])),
//! ])
//! .unwrap();
//!
//! assert_eq!(frame.n_rows(), 2);
//! assert_eq!(frame.numeric("alcohol").unwrap(), &[9.0, 10.0]);
//! ```

pub mod csv_io;

pub use csv_io::{read_csv, read_csv_from_reader, write_csv, write_csv_to_writer};

use crate::error::WrangleError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of values a column holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    fn describe(self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }
}

/// A single column of values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(values) => Some(values),
            Column::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&[String]> {
        match self {
            Column::Categorical(values) => Some(values),
            Column::Numeric(_) => None,
        }
    }

    /// String key for the value at `row`, used to group rows into classes.
    ///
    /// Integral numeric values render without a fractional part so that a
    /// quality score of `5.0` groups as `"5"`.
    pub fn class_key(&self, row: usize) -> String {
        match self {
            Column::Numeric(values) => {
                let v = values[row];
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
                    format!("{}", v as i64)
                } else {
                    format!("{}", v)
                }
            }
            Column::Categorical(values) => values[row].clone(),
        }
    }

    /// Gather the values at `positions`, in that order.
    pub fn take(&self, positions: &[usize]) -> Column {
        match self {
            Column::Numeric(values) => {
                Column::Numeric(positions.iter().map(|&p| values[p]).collect())
            }
            Column::Categorical(values) => {
                Column::Categorical(positions.iter().map(|&p| values[p].clone()).collect())
            }
        }
    }

    fn extend_from(&mut self, other: &Column, name: &str) -> Result<(), WrangleError> {
        match (self, other) {
            (Column::Numeric(a), Column::Numeric(b)) => {
                a.extend_from_slice(b);
                Ok(())
            }
            (Column::Categorical(a), Column::Categorical(b)) => {
                a.extend(b.iter().cloned());
                Ok(())
            }
            // A column that is numeric on one side and text on the other is
            // kept as text, the way a CSV reader would type the merged file.
            (this, other) => {
                let mut merged = this.to_strings();
                merged.extend(other.to_strings());
                tracing::debug!(column = name, "widening mixed-kind column to categorical");
                *this = Column::Categorical(merged);
                Ok(())
            }
        }
    }

    fn to_strings(&self) -> Vec<String> {
        match self {
            Column::Numeric(values) => values
                .iter()
                .map(|v| if v.is_nan() { String::new() } else { v.to_string() })
                .collect(),
            Column::Categorical(values) => values.clone(),
        }
    }
}

/// An ordered collection of named, equal-length columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    row_ids: Vec<usize>,
}

impl Frame {
    /// Build a frame from `(name, column)` pairs.
    ///
    /// Row ids default to `0..n_rows`.
    ///
    /// # Errors
    /// Returns [`WrangleError::InvalidParameter`] if column lengths differ or a
    /// name is repeated.
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self, WrangleError> {
        let n_rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let mut seen = HashSet::new();
        for (name, column) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(WrangleError::InvalidParameter(format!(
                    "duplicate column name {}",
                    name
                )));
            }
            if column.len() != n_rows {
                return Err(WrangleError::InvalidParameter(format!(
                    "column {} has {} rows, expected {}",
                    name,
                    column.len(),
                    n_rows
                )));
            }
        }
        let (names, columns) = columns.into_iter().unzip();
        Ok(Self {
            names,
            columns,
            row_ids: (0..n_rows).collect(),
        })
    }

    /// An empty frame with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            row_ids: Vec::new(),
        }
    }

    /// Replace the row ids.
    pub fn with_row_ids(mut self, row_ids: Vec<usize>) -> Result<Self, WrangleError> {
        if row_ids.len() != self.n_rows() {
            return Err(WrangleError::InvalidParameter(format!(
                "{} row ids for {} rows",
                row_ids.len(),
                self.n_rows()
            )));
        }
        self.row_ids = row_ids;
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        self.row_ids.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn row_ids(&self) -> &[usize] {
        &self.row_ids
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Index of the column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Iterate over `(name, column)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    pub fn column(&self, name: &str) -> Result<&Column, WrangleError> {
        self.position(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| WrangleError::ColumnNotFound(name.to_string()))
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64], WrangleError> {
        self.column(name)?
            .as_numeric()
            .ok_or_else(|| type_mismatch(name, ColumnKind::Numeric))
    }

    pub fn categorical(&self, name: &str) -> Result<&[String], WrangleError> {
        self.column(name)?
            .as_categorical()
            .ok_or_else(|| type_mismatch(name, ColumnKind::Categorical))
    }

    /// Names of all numeric columns, in order.
    pub fn numeric_names(&self) -> Vec<String> {
        self.names_of_kind(ColumnKind::Numeric)
    }

    /// Names of all categorical columns, in order.
    pub fn categorical_names(&self) -> Vec<String> {
        self.names_of_kind(ColumnKind::Categorical)
    }

    fn names_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.iter()
            .filter(|(_, c)| c.kind() == kind)
            .map(|(n, _)| n.to_string())
            .collect()
    }

    /// Set a column, replacing an existing one of the same name in place or
    /// appending otherwise.
    pub fn set_column(&mut self, name: &str, column: Column) -> Result<(), WrangleError> {
        if self.n_cols() > 0 && column.len() != self.n_rows() {
            return Err(WrangleError::InvalidParameter(format!(
                "column {} has {} rows, expected {}",
                name,
                column.len(),
                self.n_rows()
            )));
        }
        if self.n_cols() == 0 && self.row_ids.is_empty() {
            self.row_ids = (0..column.len()).collect();
        }
        match self.position(name) {
            Some(i) => self.columns[i] = column,
            None => {
                self.names.push(name.to_string());
                self.columns.push(column);
            }
        }
        Ok(())
    }

    /// Insert a new column at `index`.
    pub fn insert_column(
        &mut self,
        index: usize,
        name: &str,
        column: Column,
    ) -> Result<(), WrangleError> {
        if self.contains(name) {
            return Err(WrangleError::InvalidParameter(format!(
                "duplicate column name {}",
                name
            )));
        }
        if column.len() != self.n_rows() {
            return Err(WrangleError::InvalidParameter(format!(
                "column {} has {} rows, expected {}",
                name,
                column.len(),
                self.n_rows()
            )));
        }
        let index = index.min(self.n_cols());
        self.names.insert(index, name.to_string());
        self.columns.insert(index, column);
        Ok(())
    }

    /// Remove a column and return it.
    pub fn remove_column(&mut self, name: &str) -> Result<Column, WrangleError> {
        let i = self
            .position(name)
            .ok_or_else(|| WrangleError::ColumnNotFound(name.to_string()))?;
        self.names.remove(i);
        Ok(self.columns.remove(i))
    }

    /// Rename every column with `f`.
    pub fn rename_columns<F: Fn(&str) -> String>(&mut self, f: F) -> Result<(), WrangleError> {
        let renamed: Vec<String> = self.names.iter().map(|n| f(n)).collect();
        let unique: HashSet<&String> = renamed.iter().collect();
        if unique.len() != renamed.len() {
            return Err(WrangleError::InvalidParameter(format!(
                "renaming produces duplicate column names: {:?}",
                renamed
            )));
        }
        self.names = renamed;
        Ok(())
    }

    /// Rows at `positions`, in that order. Row ids follow their rows.
    pub fn take_rows(&self, positions: &[usize]) -> Frame {
        Frame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(positions)).collect(),
            row_ids: positions.iter().map(|&p| self.row_ids[p]).collect(),
        }
    }

    /// Rows where `mask` is true.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Frame, WrangleError> {
        if mask.len() != self.n_rows() {
            return Err(WrangleError::InvalidParameter(format!(
                "mask has {} entries for {} rows",
                mask.len(),
                self.n_rows()
            )));
        }
        let positions: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, &keep)| keep)
            .map(|(i, _)| i)
            .collect();
        Ok(self.take_rows(&positions))
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[String]) -> Result<Frame, WrangleError> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            columns.push(self.column(name)?.clone());
        }
        Ok(Frame {
            names: names.to_vec(),
            columns,
            row_ids: self.row_ids.clone(),
        })
    }

    /// Stack `frames` vertically, matching columns by name.
    ///
    /// Every frame must have the same column set; the output follows the
    /// first frame's column order and gets fresh row ids `0..n`.
    pub fn concat(frames: &[Frame]) -> Result<Frame, WrangleError> {
        let Some(first) = frames.first() else {
            return Ok(Frame::empty());
        };
        let mut out = first.clone();
        for frame in &frames[1..] {
            if frame.n_cols() != out.n_cols() {
                return Err(WrangleError::InvalidParameter(format!(
                    "cannot concat frames with {} and {} columns",
                    out.n_cols(),
                    frame.n_cols()
                )));
            }
            for i in 0..out.n_cols() {
                let name = out.names[i].clone();
                let other = frame.column(&name)?;
                out.columns[i].extend_from(other, &name)?;
            }
            out.row_ids.extend(frame.row_ids.iter().copied());
        }
        out.row_ids = (0..out.row_ids.len()).collect();
        Ok(out)
    }

    /// Convert to a dense `(n_rows, n_cols)` matrix.
    ///
    /// # Errors
    /// Returns [`WrangleError::TypeMismatch`] if any column is categorical.
    pub fn to_array(&self) -> Result<Array2<f64>, WrangleError> {
        let (rows, cols) = (self.n_rows(), self.n_cols());
        let mut numeric = Vec::with_capacity(cols);
        for (name, column) in self.iter() {
            numeric.push(
                column
                    .as_numeric()
                    .ok_or_else(|| type_mismatch(name, ColumnKind::Numeric))?,
            );
        }
        Ok(Array2::from_shape_fn((rows, cols), |(r, c)| numeric[c][r]))
    }
}

fn type_mismatch(name: &str, expected: ColumnKind) -> WrangleError {
    WrangleError::TypeMismatch {
        column: name.to_string(),
        expected: expected.describe().to_string(),
    }
}
