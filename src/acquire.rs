//! Acquisition of the red and white wine sources.
//!
//! The two UCI files share a schema but carry no column saying which source a
//! row came from. [`merge_sources`] adds that column (`type`), stacks the rows
//! and normalizes column names (`"fixed acidity"` becomes `fixed_acidity`,
//! `"pH"` becomes `ph`). [`acquire_wine`] wraps that with file reading and an
//! optional merge cache.
//!
//! The cache is a plain CSV of the merged table. When it exists it is read
//! as-is; nothing checks whether the raw files changed since it was written,
//! so set [`WineSources::refresh_cache`] to force a re-merge.

use crate::error::WrangleError;
use crate::frame::{read_csv, write_csv, Column, Frame};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Column holding the source tag (`red` / `white`).
pub const TYPE_COLUMN: &str = "type";

/// Column holding the integer quality score.
pub const QUALITY_COLUMN: &str = "quality";

/// Lowercase a column name and replace spaces and periods with underscores.
///
/// ```
/// use wine_wrangle::acquire::normalize_column_name;
///
/// assert_eq!(normalize_column_name("free sulfur dioxide"), "free_sulfur_dioxide");
/// assert_eq!(normalize_column_name("pH"), "ph");
/// ```
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '.'], "_")
}

/// Where to find the raw sources and the optional merge cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WineSources {
    /// Red wine samples.
    pub red: PathBuf,
    /// White wine samples.
    pub white: PathBuf,
    /// Merged table cache. `None` disables caching.
    pub cache: Option<PathBuf>,
    /// Field delimiter of the raw files.
    pub delimiter: char,
    /// Re-merge even when the cache file exists.
    pub refresh_cache: bool,
}

impl Default for WineSources {
    fn default() -> Self {
        Self {
            red: PathBuf::from("winequality-red.csv"),
            white: PathBuf::from("winequality-white.csv"),
            cache: None,
            delimiter: ',',
            refresh_cache: false,
        }
    }
}

impl WineSources {
    pub fn new(red: impl Into<PathBuf>, white: impl Into<PathBuf>) -> Self {
        Self {
            red: red.into(),
            white: white.into(),
            ..Self::default()
        }
    }

    pub fn with_cache(mut self, cache: impl Into<PathBuf>) -> Self {
        self.cache = Some(cache.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_refresh_cache(mut self, refresh: bool) -> Self {
        self.refresh_cache = refresh;
        self
    }

    fn delimiter_byte(&self) -> Result<u8, WrangleError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(WrangleError::InvalidParameter(format!(
                "delimiter {:?} is not an ASCII character",
                self.delimiter
            )))
        }
    }
}

/// Tag, stack and normalize the two source tables.
///
/// # Errors
/// - [`WrangleError::SchemaMismatch`] if the normalized column sets differ.
/// - [`WrangleError::ColumnNotFound`] if there is no `quality` column.
/// - [`WrangleError::MissingValues`] if any quality score is missing.
pub fn merge_sources(mut red: Frame, mut white: Frame) -> Result<Frame, WrangleError> {
    red.rename_columns(normalize_column_name)?;
    white.rename_columns(normalize_column_name)?;

    let red_names: BTreeSet<&String> = red.names().iter().collect();
    let white_names: BTreeSet<&String> = white.names().iter().collect();
    if red_names != white_names {
        return Err(WrangleError::SchemaMismatch {
            only_in_red: red_names
                .difference(&white_names)
                .map(|s| s.to_string())
                .collect(),
            only_in_white: white_names
                .difference(&red_names)
                .map(|s| s.to_string())
                .collect(),
        });
    }

    let red_rows = red.n_rows();
    let white_rows = white.n_rows();
    red.set_column(
        TYPE_COLUMN,
        Column::Categorical(vec!["red".to_string(); red_rows]),
    )?;
    white.set_column(
        TYPE_COLUMN,
        Column::Categorical(vec!["white".to_string(); white_rows]),
    )?;

    let merged = Frame::concat(&[red, white])?;
    check_quality(&merged)?;
    tracing::info!(red_rows, white_rows, total = merged.n_rows(), "merged wine sources");
    Ok(merged)
}

fn check_quality(frame: &Frame) -> Result<(), WrangleError> {
    let quality = frame.numeric(QUALITY_COLUMN)?;
    let missing = quality.iter().filter(|q| q.is_nan()).count();
    if missing > 0 {
        return Err(WrangleError::MissingValues(format!(
            "{} rows have no {} score",
            missing, QUALITY_COLUMN
        )));
    }
    Ok(())
}

/// Load the merged wine table, using the cache when configured.
pub fn acquire_wine(sources: &WineSources) -> Result<Frame, WrangleError> {
    let delimiter = sources.delimiter_byte()?;

    if let Some(cache) = &sources.cache {
        if cache.exists() && !sources.refresh_cache {
            tracing::info!(cache = %cache.display(), "reading merged table from cache");
            let mut frame = read_csv(cache, b',')?;
            frame.rename_columns(normalize_column_name)?;
            check_quality(&frame)?;
            frame.categorical(TYPE_COLUMN)?;
            return Ok(frame);
        }
    }

    let red = read_csv(&sources.red, delimiter)?;
    let white = read_csv(&sources.white, delimiter)?;
    let merged = merge_sources(red, white)?;

    if let Some(cache) = &sources.cache {
        write_csv(&merged, cache, b',')?;
        tracing::info!(cache = %cache.display(), "wrote merge cache");
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::read_csv_from_reader;
    use std::fs;

    const RED: &str = "\"fixed acidity\";\"density\";\"pH\";\"quality\"\n\
                       7.4;0.9978;3.51;5\n\
                       7.8;0.9968;3.2;5\n";
    const WHITE: &str = "\"fixed acidity\";\"density\";\"pH\";\"quality\"\n\
                         7;1.001;3;6\n\
                         6.3;0.994;3.3;6\n\
                         8.1;0.9951;3.26;6\n";

    fn frames() -> (Frame, Frame) {
        (
            read_csv_from_reader(RED.as_bytes(), b';').unwrap(),
            read_csv_from_reader(WHITE.as_bytes(), b';').unwrap(),
        )
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("fixed acidity"), "fixed_acidity");
        assert_eq!(normalize_column_name("Sulphates.Total"), "sulphates_total");
        assert_eq!(normalize_column_name("pH"), "ph");
    }

    #[test]
    fn test_merge_counts_and_tags() {
        let (red, white) = frames();
        let merged = merge_sources(red, white).unwrap();

        assert_eq!(merged.n_rows(), 5);
        let tags = merged.categorical(TYPE_COLUMN).unwrap();
        assert_eq!(tags.iter().filter(|t| *t == "red").count(), 2);
        assert_eq!(tags.iter().filter(|t| *t == "white").count(), 3);
        assert_eq!(&tags[..2], &["red", "red"]);
        assert!(merged.contains("fixed_acidity"));
        assert!(merged.contains("ph"));
    }

    #[test]
    fn test_merge_schema_mismatch() {
        let (red, _) = frames();
        let white = read_csv_from_reader(
            "\"fixed acidity\";\"alcohol\";\"pH\";\"quality\"\n7;9;3;6\n".as_bytes(),
            b';',
        )
        .unwrap();
        match merge_sources(red, white) {
            Err(WrangleError::SchemaMismatch {
                only_in_red,
                only_in_white,
            }) => {
                assert_eq!(only_in_red, vec!["density".to_string()]);
                assert_eq!(only_in_white, vec!["alcohol".to_string()]);
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_rejects_missing_quality() {
        let red = read_csv_from_reader("density,quality\n0.99,\n".as_bytes(), b',').unwrap();
        let white = read_csv_from_reader("density,quality\n0.99,6\n".as_bytes(), b',').unwrap();
        assert!(matches!(
            merge_sources(red, white),
            Err(WrangleError::MissingValues(_))
        ));
    }

    #[test]
    fn test_acquire_writes_and_reuses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let red_path = dir.path().join("red.csv");
        let white_path = dir.path().join("white.csv");
        let cache_path = dir.path().join("wine.csv");
        fs::write(&red_path, RED).unwrap();
        fs::write(&white_path, WHITE).unwrap();

        let sources = WineSources::new(&red_path, &white_path)
            .with_delimiter(';')
            .with_cache(&cache_path);

        let first = acquire_wine(&sources).unwrap();
        assert!(cache_path.exists());

        // The cache wins even after the raw files disappear.
        fs::remove_file(&red_path).unwrap();
        let second = acquire_wine(&sources).unwrap();
        assert_eq!(second.n_rows(), first.n_rows());
        assert_eq!(second.names(), first.names());
        assert_eq!(
            second.numeric("density").unwrap(),
            first.numeric("density").unwrap()
        );

        let refreshed = acquire_wine(&sources.clone().with_refresh_cache(true));
        assert!(matches!(refreshed, Err(WrangleError::IoError(_))));
    }

    #[test]
    fn test_cache_without_type_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("wine.csv");
        fs::write(&cache_path, "density,quality\n0.99,5\n0.995,6\n").unwrap();

        let sources = WineSources::new(dir.path().join("red.csv"), dir.path().join("white.csv"))
            .with_cache(&cache_path);
        match acquire_wine(&sources) {
            Err(WrangleError::ColumnNotFound(name)) => assert_eq!(name, TYPE_COLUMN),
            other => panic!("expected ColumnNotFound, got {:?}", other.map(|f| f.n_rows())),
        }
    }

    #[test]
    fn test_acquire_missing_source_fails() {
        let sources = WineSources::new("/nonexistent/red.csv", "/nonexistent/white.csv");
        assert!(matches!(
            acquire_wine(&sources),
            Err(WrangleError::IoError(_))
        ));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let sources = WineSources::default().with_delimiter('§');
        assert!(matches!(
            acquire_wine(&sources),
            Err(WrangleError::InvalidParameter(_))
        ));
    }
}
