//! One-hot encoding for categorical columns.
//!
//! Each encoded column is removed and replaced by indicator columns named
//! `{column}_{category}` holding `1.0` or `0.0`, appended after the remaining
//! columns. With `drop_first` the indicator for the first (smallest) category
//! is omitted, so a row of that category has all indicators zero.

use super::{HandleUnknown, Vocabulary};
use crate::error::WrangleError;
use crate::frame::{Column, Frame};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

/// Name of the indicator column for `category` of `column`.
pub fn indicator_name(column: &str, category: &str) -> String {
    format!("{}_{}", column, category)
}

/// One-hot encoder for categorical columns.
///
/// # Example
/// ```ignore
/// use wine_wrangle::preprocessing::{FittedOneHotEncoder, HandleUnknown, Vocabulary};
///
/// let vocab = Vocabulary::from_frame(&full_table);
/// let encoder = FittedOneHotEncoder::from_vocabulary(vocab, true, HandleUnknown::Error);
/// let train = encoder.transform(&train)?;
/// let test = encoder.transform(&test)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct OneHotEncoder {
    drop_first: bool,
    handle_unknown: HandleUnknown,
    /// Columns to encode; every categorical column when `None`.
    columns: Option<Vec<String>>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Omit the indicator for the first category of each column.
    pub fn with_drop_first(mut self, drop_first: bool) -> Self {
        self.drop_first = drop_first;
        self
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }

    /// Restrict encoding to the named columns.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }
}

impl Transformer for OneHotEncoder {
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, data: &Frame) -> Result<Self::Fitted, WrangleError> {
        if data.is_empty() {
            return Err(WrangleError::EmptyData(
                "Cannot fit OneHotEncoder on empty data".to_string(),
            ));
        }
        let vocabulary = match &self.columns {
            Some(columns) => Vocabulary::from_columns(data, columns)?,
            None => Vocabulary::from_frame(data),
        };
        Ok(FittedOneHotEncoder::from_vocabulary(
            vocabulary,
            self.drop_first,
            self.handle_unknown,
        ))
    }
}

/// Serializable parameters for a fitted OneHotEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoderParams {
    pub vocabulary: Vocabulary,
    pub drop_first: bool,
    pub handle_unknown: HandleUnknown,
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedOneHotEncoder {
    vocabulary: Vocabulary,
    drop_first: bool,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    /// Encoder over a precomputed vocabulary.
    pub fn from_vocabulary(
        vocabulary: Vocabulary,
        drop_first: bool,
        handle_unknown: HandleUnknown,
    ) -> Self {
        Self {
            vocabulary,
            drop_first,
            handle_unknown,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Number of indicator columns produced.
    pub fn n_features_out(&self) -> usize {
        self.vocabulary.n_indicators(self.drop_first)
    }

    /// Indicator column names, in output order.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.vocabulary
            .entries()
            .iter()
            .flat_map(|(column, cats)| {
                self.kept(cats)
                    .iter()
                    .map(move |cat| indicator_name(column, cat))
            })
            .collect()
    }

    fn kept<'a>(&self, categories: &'a [String]) -> &'a [String] {
        if self.drop_first && !categories.is_empty() {
            &categories[1..]
        } else {
            categories
        }
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    type Params = OneHotEncoderParams;

    fn transform(&self, data: &Frame) -> Result<Frame, WrangleError> {
        let mut out = data.clone();
        let mut indicators: Vec<(String, Column)> = Vec::with_capacity(self.n_features_out());

        for (column, categories) in self.vocabulary.entries() {
            let values = data.categorical(column)?;

            if self.handle_unknown == HandleUnknown::Error {
                if let Some(unknown) = values
                    .iter()
                    .find(|v| categories.binary_search(v).is_err())
                {
                    return Err(WrangleError::InvalidParameter(format!(
                        "unknown category {:?} in column {}",
                        unknown, column
                    )));
                }
            }

            for category in self.kept(categories) {
                let indicator = values
                    .iter()
                    .map(|v| if v == category { 1.0 } else { 0.0 })
                    .collect();
                indicators.push((indicator_name(column, category), Column::Numeric(indicator)));
            }
            out.remove_column(column)?;
        }

        for (name, indicator) in indicators {
            if out.contains(&name) {
                return Err(WrangleError::InvalidParameter(format!(
                    "indicator column {} collides with an existing column",
                    name
                )));
            }
            out.set_column(&name, indicator)?;
        }
        Ok(out)
    }

    /// Restore the categorical columns from their indicators.
    ///
    /// A row with every indicator zero decodes to the dropped first category
    /// when `drop_first` is set, and to an empty string otherwise.
    fn inverse_transform(&self, data: &Frame) -> Result<Frame, WrangleError> {
        let mut out = data.clone();
        for (column, categories) in self.vocabulary.entries() {
            let kept = self.kept(categories);
            let mut decoded = vec![String::new(); data.n_rows()];
            if self.drop_first {
                if let Some(first) = categories.first() {
                    decoded.iter_mut().for_each(|d| *d = first.clone());
                }
            }
            for category in kept {
                let name = indicator_name(column, category);
                for (row, &v) in data.numeric(&name)?.iter().enumerate() {
                    if v == 1.0 {
                        decoded[row] = category.clone();
                    }
                }
                out.remove_column(&name)?;
            }
            out.set_column(column, Column::Categorical(decoded))?;
        }
        Ok(out)
    }

    fn extract_params(&self) -> Self::Params {
        OneHotEncoderParams {
            vocabulary: self.vocabulary.clone(),
            drop_first: self.drop_first,
            handle_unknown: self.handle_unknown,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, WrangleError> {
        Ok(Self::from_vocabulary(
            params.vocabulary,
            params.drop_first,
            params.handle_unknown,
        ))
    }

    fn n_features_in(&self) -> usize {
        self.vocabulary.len()
    }
}
