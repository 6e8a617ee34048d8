//! Error types for the wrangling pipeline.

use std::fmt;

/// Error type for every stage of the pipeline.
#[derive(Debug)]
pub enum WrangleError {
    /// I/O error while reading or writing a file.
    IoError(String),
    /// Malformed delimited input.
    CsvError(String),
    /// The red and white sources do not share a column set.
    SchemaMismatch {
        only_in_red: Vec<String>,
        only_in_white: Vec<String>,
    },
    /// A column required by a stage is absent.
    ColumnNotFound(String),
    /// A column has the wrong kind (numeric vs categorical) for the operation.
    TypeMismatch { column: String, expected: String },
    /// Data contains missing values where they are not allowed.
    MissingValues(String),
    /// An engineered column produced NaN or infinite values.
    NonFiniteValues { column: String, count: usize },
    /// A stratification class is too small to appear in every partition.
    UnderpopulatedClass {
        column: String,
        class: String,
        count: usize,
        required: usize,
    },
    /// Invalid parameter or configuration value.
    InvalidParameter(String),
    /// Empty data provided where non-empty was required.
    EmptyData(String),
    /// Column count mismatch between fitted parameters and input.
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// Serialization or deserialization error.
    SerializationError(String),
}

impl fmt::Display for WrangleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrangleError::IoError(msg) => write!(f, "I/O error: {}", msg),
            WrangleError::CsvError(msg) => write!(f, "CSV error: {}", msg),
            WrangleError::SchemaMismatch {
                only_in_red,
                only_in_white,
            } => write!(
                f,
                "Schema mismatch: columns only in red source {:?}, only in white source {:?}",
                only_in_red, only_in_white
            ),
            WrangleError::ColumnNotFound(name) => write!(f, "Column not found: {}", name),
            WrangleError::TypeMismatch { column, expected } => {
                write!(f, "Type mismatch: column {} is not {}", column, expected)
            }
            WrangleError::MissingValues(msg) => write!(f, "Missing values: {}", msg),
            WrangleError::NonFiniteValues { column, count } => write!(
                f,
                "Non-finite values: column {} has {} NaN or infinite entries",
                column, count
            ),
            WrangleError::UnderpopulatedClass {
                column,
                class,
                count,
                required,
            } => write!(
                f,
                "Underpopulated class: {} = {} has {} members, needs at least {}",
                column, class, count, required
            ),
            WrangleError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            WrangleError::EmptyData(msg) => write!(f, "Empty data: {}", msg),
            WrangleError::FeatureMismatch {
                expected_features,
                got_features,
            } => write!(
                f,
                "Feature mismatch: expected {} features, got {}",
                expected_features, got_features
            ),
            WrangleError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for WrangleError {}

impl From<std::io::Error> for WrangleError {
    fn from(err: std::io::Error) -> Self {
        WrangleError::IoError(err.to_string())
    }
}

impl From<csv::Error> for WrangleError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            WrangleError::IoError(err.to_string())
        } else {
            WrangleError::CsvError(err.to_string())
        }
    }
}

impl From<bincode::Error> for WrangleError {
    fn from(err: bincode::Error) -> Self {
        WrangleError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for WrangleError {
    fn from(err: serde_json::Error) -> Self {
        WrangleError::SerializationError(err.to_string())
    }
}
