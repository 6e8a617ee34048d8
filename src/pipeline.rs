//! End-to-end preparation of the wine table.
//!
//! [`WinePipeline::run`] applies the configured stages in a fixed order:
//!
//! ```text
//! filter -> engineer -> bin quality -> cluster -> vocabulary
//!        -> split -> encode -> scale (fit on train) -> xy_split
//! ```
//!
//! Everything up to the vocabulary sees the whole table. After the split each
//! partition is transformed with values fitted once: the vocabulary from the
//! full table and the scaler from the training partition.

use crate::acquire::{acquire_wine, WineSources};
use crate::cluster::attach_clusters;
use crate::config::{PipelineConfig, ScalerKind};
use crate::error::WrangleError;
use crate::features::{bin_quality, engineer_features, QUALITY_BINS_COLUMN};
use crate::filter::apply_filters;
use crate::frame::{write_csv, Frame};
use crate::preprocessing::{
    ColumnSelection, FittedOneHotEncoder, FittedScaler, FittedTransformer, MinMaxScaler,
    StandardScaler, Transformer, Vocabulary,
};
use crate::split::{train_validate_test_split, Partitions};
use crate::target::{xy_split, Xy};
use std::path::Path;

/// Prepared partitions and the fitted values used to produce them.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub train: Xy,
    pub validate: Xy,
    pub test: Xy,
    /// Categories encoded into indicator columns.
    pub vocabulary: Vocabulary,
    /// Scaler fitted on the training partition, if scaling ran.
    pub scaler: Option<FittedScaler>,
}

impl PipelineOutput {
    /// Write `train.csv`, `validate.csv` and `test.csv` (target included) to `dir`.
    pub fn write_csvs<P: AsRef<Path>>(&self, dir: P) -> Result<(), WrangleError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for (name, xy) in [
            ("train", &self.train),
            ("validate", &self.validate),
            ("test", &self.test),
        ] {
            let path = dir.join(format!("{}.csv", name));
            write_csv(&xy.reassemble()?, &path, b',')?;
            tracing::debug!(path = %path.display(), rows = xy.n_samples(), "wrote partition");
        }
        Ok(())
    }
}

/// The configured preparation pipeline.
#[derive(Clone, Debug, Default)]
pub struct WinePipeline {
    config: PipelineConfig,
}

impl WinePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Acquire the merged table from `sources`, then [`run`](Self::run).
    pub fn run_from_sources(&self, sources: &WineSources) -> Result<PipelineOutput, WrangleError> {
        let frame = acquire_wine(sources)?;
        self.run(&frame)
    }

    /// Prepare an acquired table.
    pub fn run(&self, frame: &Frame) -> Result<PipelineOutput, WrangleError> {
        let config = &self.config;
        config.validate()?;
        tracing::info!(rows = frame.n_rows(), columns = frame.n_cols(), "pipeline start");

        let mut table = apply_filters(frame, &config.filters)?;
        if table.is_empty() {
            return Err(WrangleError::EmptyData(
                "no rows left after filtering".to_string(),
            ));
        }
        if !config.features.is_empty() {
            table = engineer_features(&table, &config.features, config.non_finite)?;
        }
        if config.bin_quality {
            table = bin_quality(&table)?;
        }
        if let Some(cluster) = &config.cluster {
            table = attach_clusters(&table, cluster)?;
        }

        let encoded_columns: Vec<String> = table
            .categorical_names()
            .into_iter()
            .filter(|name| !(config.bin_quality && name == QUALITY_BINS_COLUMN))
            .collect();
        let vocabulary = Vocabulary::from_columns(&table, &encoded_columns)?;
        tracing::debug!(
            columns = vocabulary.len(),
            indicators = vocabulary.n_indicators(config.encoding.drop_first),
            "built vocabulary"
        );

        let mut partitions = train_validate_test_split(&table, &config.split)?;
        if config.bin_quality {
            partitions = partitions.try_map(|p| {
                let mut p = p.clone();
                p.remove_column(QUALITY_BINS_COLUMN)?;
                Ok(p)
            })?;
        }

        // Default scaling columns are the numeric ones present before encoding.
        let scale_columns = match config.scaling.as_ref().map(|s| s.columns.clone()) {
            Some(Some(columns)) => columns,
            _ => partitions
                .train
                .numeric_names()
                .into_iter()
                .filter(|name| name != &config.target)
                .collect(),
        };

        let encoder = FittedOneHotEncoder::from_vocabulary(
            vocabulary.clone(),
            config.encoding.drop_first,
            config.encoding.handle_unknown,
        );
        let partitions = partitions.try_map(|p| encoder.transform(p))?;

        let (partitions, scaler) = match &config.scaling {
            None => (partitions, None),
            Some(scaling) => {
                let selection = ColumnSelection::Named(scale_columns);
                let (scaled, fitted) = match scaling.kind {
                    ScalerKind::MinMax => {
                        let (scaled, fitted) = fit_on_train(
                            &MinMaxScaler::new().with_columns(selection),
                            &partitions,
                        )?;
                        (scaled, FittedScaler::MinMax(fitted))
                    }
                    ScalerKind::Standard => {
                        let (scaled, fitted) = fit_on_train(
                            &StandardScaler::new().with_columns(selection),
                            &partitions,
                        )?;
                        (scaled, FittedScaler::Standard(fitted))
                    }
                };
                (scaled, Some(fitted))
            }
        };

        let output = PipelineOutput {
            train: xy_split(&partitions.train, &config.target)?,
            validate: xy_split(&partitions.validate, &config.target)?,
            test: xy_split(&partitions.test, &config.target)?,
            vocabulary,
            scaler,
        };
        tracing::info!(
            train = output.train.n_samples(),
            validate = output.validate.n_samples(),
            test = output.test.n_samples(),
            features = output.train.feature_names().len(),
            "pipeline done"
        );
        Ok(output)
    }
}

/// Fit `transformer` on the training partition and apply it to all three.
fn fit_on_train<T: Transformer>(
    transformer: &T,
    partitions: &Partitions,
) -> Result<(Partitions, T::Fitted), WrangleError> {
    let fitted = transformer.fit(&partitions.train)?;
    let transformed = partitions.try_map(|p| fitted.transform(p))?;
    Ok((transformed, fitted))
}
