//! Pipeline configuration.
//!
//! A [`PipelineConfig`] names every optional stage and its parameters. Build
//! one in code from a preset plus `with_*` methods, or load it from JSON; any
//! field missing from the JSON takes its default.
//!
//! ```
//! use wine_wrangle::config::PipelineConfig;
//! use wine_wrangle::features::DerivedFeature;
//!
//! let config = PipelineConfig::eighty_twenty()
//!     .with_features(DerivedFeature::ALL.to_vec())
//!     .with_stratify("quality");
//! assert_eq!(config.split.seed, 1349);
//! ```

use crate::acquire::QUALITY_COLUMN;
use crate::cluster::ClusterSpec;
use crate::error::WrangleError;
use crate::features::{DerivedFeature, NonFinitePolicy};
use crate::filter::{outlier_filters, RangeFilter};
use crate::preprocessing::HandleUnknown;
use crate::split::SplitConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One-hot encoding options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub drop_first: bool,
    pub handle_unknown: HandleUnknown,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            drop_first: true,
            handle_unknown: HandleUnknown::Error,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    #[default]
    MinMax,
    Standard,
}

/// Scaling options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    pub kind: ScalerKind,
    /// Columns to scale. `None` scales every numeric column except the target.
    pub columns: Option<Vec<String>>,
}

/// Full pipeline configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Target column removed from the features.
    pub target: String,
    /// Rows failing any filter are dropped before anything else runs.
    pub filters: Vec<RangeFilter>,
    pub features: Vec<DerivedFeature>,
    pub non_finite: NonFinitePolicy,
    /// Add `quality_bins` for stratification. The column is dropped before
    /// encoding since it is derived from the target.
    pub bin_quality: bool,
    pub cluster: Option<ClusterSpec>,
    pub split: SplitConfig,
    pub encoding: EncodingConfig,
    /// `None` leaves the numeric columns unscaled.
    pub scaling: Option<ScalingConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::seventy_fifteen_fifteen()
    }
}

impl PipelineConfig {
    /// Outlier filters, 70/15/15 split with seed 42, drop-first encoding and
    /// min-max scaling.
    pub fn seventy_fifteen_fifteen() -> Self {
        Self {
            target: QUALITY_COLUMN.to_string(),
            filters: outlier_filters(),
            features: Vec::new(),
            non_finite: NonFinitePolicy::default(),
            bin_quality: false,
            cluster: None,
            split: SplitConfig::seventy_fifteen_fifteen(),
            encoding: EncodingConfig::default(),
            scaling: Some(ScalingConfig::default()),
        }
    }

    /// Same stages as [`seventy_fifteen_fifteen`](Self::seventy_fifteen_fifteen)
    /// with the 80/20 then 70/30 split and seed 1349.
    pub fn eighty_twenty() -> Self {
        Self {
            split: SplitConfig::eighty_twenty(),
            ..Self::seventy_fifteen_fifteen()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_filters(mut self, filters: Vec<RangeFilter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_features(mut self, features: Vec<DerivedFeature>) -> Self {
        self.features = features;
        self
    }

    pub fn with_non_finite(mut self, policy: NonFinitePolicy) -> Self {
        self.non_finite = policy;
        self
    }

    pub fn with_bin_quality(mut self, bin: bool) -> Self {
        self.bin_quality = bin;
        self
    }

    pub fn with_cluster(mut self, cluster: ClusterSpec) -> Self {
        self.cluster = Some(cluster);
        self
    }

    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.split.seed = seed;
        self
    }

    pub fn with_stratify(mut self, column: impl Into<String>) -> Self {
        self.split.stratify = Some(column.into());
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_scaling(mut self, scaling: Option<ScalingConfig>) -> Self {
        self.scaling = scaling;
        self
    }

    /// Check parameters that can be rejected before touching any data.
    pub fn validate(&self) -> Result<(), WrangleError> {
        if self.target.is_empty() {
            return Err(WrangleError::InvalidParameter(
                "target column name is empty".to_string(),
            ));
        }
        for (label, fraction) in [
            ("primary_fraction", self.split.primary_fraction),
            ("secondary_fraction", self.split.secondary_fraction),
        ] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(WrangleError::InvalidParameter(format!(
                    "{} must lie in [0, 1], got {}",
                    label, fraction
                )));
            }
        }
        if let Some(cluster) = &self.cluster {
            if cluster.kmeans.n_clusters == 0 {
                return Err(WrangleError::InvalidParameter(
                    "cluster count must be at least 1".to_string(),
                ));
            }
            if cluster.output == self.target {
                return Err(WrangleError::InvalidParameter(format!(
                    "cluster output would overwrite the target column {}",
                    self.target
                )));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, WrangleError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, WrangleError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| WrangleError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String, WrangleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
