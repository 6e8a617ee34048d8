//! Categorical column encoding.
//!
//! # Available Encoders
//!
//! ## OneHotEncoder
//! Replaces each categorical column with one indicator column per category.
//!
//! ```ignore
//! // type: ["red", "white", "red"]
//! // -> type_red: [1, 0, 1], type_white: [0, 1, 0]
//! ```
//!
//! # Design Notes
//!
//! The set of categories is a [`Vocabulary`] value. Build it once from the full
//! table and hand the same vocabulary to every partition's encoder so that all
//! partitions end up with identical indicator columns, even when a partition
//! happens to lack a category.

mod one_hot;
mod vocabulary;

pub use one_hot::{indicator_name, FittedOneHotEncoder, OneHotEncoder, OneHotEncoderParams};
pub use vocabulary::Vocabulary;

/// Strategy for handling unknown categories during transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Raise an error when unknown categories are encountered.
    #[default]
    Error,
    /// Ignore unknown categories (all indicators zero).
    Ignore,
}
