//! Category vocabulary shared by every partition.
//!
//! Built once from the full table, so one-hot encoding of train, validate
//! and test always yields the same indicator columns.

use crate::error::WrangleError;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sorted category values per categorical column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    entries: Vec<(String, Vec<String>)>,
}

impl Vocabulary {
    /// Vocabulary of every categorical column in `frame`, in column order.
    pub fn from_frame(frame: &Frame) -> Self {
        let entries = frame
            .iter()
            .filter_map(|(name, column)| {
                column
                    .as_categorical()
                    .map(|values| (name.to_string(), sorted_unique(values)))
            })
            .collect();
        Self { entries }
    }

    /// Vocabulary of the named columns only.
    ///
    /// # Errors
    /// `ColumnNotFound` or `TypeMismatch` if a name is missing or numeric.
    pub fn from_columns(frame: &Frame, columns: &[String]) -> Result<Self, WrangleError> {
        let mut entries = Vec::with_capacity(columns.len());
        for name in columns {
            entries.push((name.clone(), sorted_unique(frame.categorical(name)?)));
        }
        Ok(Self { entries })
    }

    /// Categories of `column`, sorted.
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cats)| cats.as_slice())
    }

    /// Column names covered by this vocabulary.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn entries(&self) -> &[(String, Vec<String>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total indicator columns an encoder with this vocabulary produces.
    pub fn n_indicators(&self, drop_first: bool) -> usize {
        self.entries
            .iter()
            .map(|(_, cats)| {
                if drop_first {
                    cats.len().saturating_sub(1)
                } else {
                    cats.len()
                }
            })
            .sum()
    }
}

fn sorted_unique(values: &[String]) -> Vec<String> {
    values
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
