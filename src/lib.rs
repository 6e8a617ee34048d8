//! # wine_wrangle
//!
//! Data preparation for the wine-quality dataset: merge the red and white
//! sample files, filter implausible readings, derive features, split into
//! train / validate / test partitions and produce numeric feature matrices
//! with the quality score as target.
//!
//! ## Core Design Principles
//!
//! - **Fit once, apply everywhere**: the category vocabulary comes from the full
//!   table and the scaler from the training partition. Both are explicit
//!   values, so every partition is transformed with the same parameters.
//! - **Deterministic**: every randomized stage takes an explicit seed.
//! - **Configuration over copies**: the 70/15/15 and 80/20 layouts are presets
//!   of one [`PipelineConfig`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use wine_wrangle::{PipelineConfig, WinePipeline, WineSources};
//!
//! let sources = WineSources::new("winequality-red.csv", "winequality-white.csv")
//!     .with_delimiter(';')
//!     .with_cache("wine.csv");
//! let output = WinePipeline::new(PipelineConfig::default())
//!     .run_from_sources(&sources)
//!     .unwrap();
//!
//! let x_train = output.train.features_array().unwrap();
//! let y_train = &output.train.target;
//! assert_eq!(x_train.nrows(), y_train.len());
//! ```
//!
//! ## Module Structure
//!
//! - `frame`: In-memory named-column table and CSV I/O
//! - `acquire`: Loading and merging the source files
//! - `filter`: Upper-bound row filters
//! - `features`: Derived columns and quality bins
//! - `cluster`: K-means labels as a feature
//! - `split`: Seeded, optionally stratified partitioning
//! - `preprocessing`: One-hot encoding and scaling transformers
//! - `target`: Feature / target separation
//! - `selection`: Univariate feature ranking
//! - `metrics`: Regression scores and a mean baseline
//! - `config`, `pipeline`: Stage configuration and orchestration
//! - `error`: The crate error type
//! - `serialization`: Persistence of fitted transformer parameters

pub mod acquire;
pub mod cluster;
pub mod config;
pub mod error;
pub mod features;
pub mod filter;
pub mod frame;
pub mod metrics;
pub mod pipeline;
pub mod preprocessing;
pub mod selection;
pub mod serialization;
pub mod split;
pub mod target;

pub use acquire::{acquire_wine, merge_sources, normalize_column_name, WineSources};
pub use config::PipelineConfig;
pub use error::WrangleError;
pub use frame::{Column, Frame};
pub use pipeline::{PipelineOutput, WinePipeline};
pub use split::{train_validate_test_split, Partitions, SplitConfig};
pub use target::{xy_split, Xy};
