//! Prepare the wine-quality dataset from the command line.
//!
//! ## Usage
//!
//! ```sh
//! wine-wrangle --red winequality-red.csv --white winequality-white.csv \
//!     --delimiter ';' --cache wine.csv --preset eighty-twenty --out-dir prepared
//! ```
//!
//! Prints partition sizes, the mean-baseline score on the validation
//! partition and optionally the top-ranked features. With `--out-dir` the
//! three partitions are written as `train.csv`, `validate.csv` and `test.csv`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;

use wine_wrangle::metrics::mean_baseline;
use wine_wrangle::preprocessing::FittedTransformer;
use wine_wrangle::selection::select_k_best;
use wine_wrangle::serialization::params_to_json;
use wine_wrangle::{PipelineConfig, WinePipeline, WineSources};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// 70% train, 15% validate, 15% test, seed 42
    SeventyFifteen,
    /// 80/20 then 70/30, seed 1349
    EightyTwenty,
}

#[derive(Parser, Debug)]
#[command(name = "wine-wrangle", about = "Prepare the wine-quality dataset for modelling")]
struct Args {
    /// Red wine samples
    #[arg(long, default_value = "winequality-red.csv")]
    red: PathBuf,

    /// White wine samples
    #[arg(long, default_value = "winequality-white.csv")]
    white: PathBuf,

    /// Field delimiter of the raw files
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Merged-table cache, read when present and written otherwise
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Re-merge the raw files even if the cache exists
    #[arg(long)]
    refresh_cache: bool,

    /// Pipeline configuration (JSON). Overrides --preset.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Preset::SeventyFifteen)]
    preset: Preset,

    /// Override the split seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stratify the split on this column
    #[arg(long)]
    stratify: Option<String>,

    /// Directory for train.csv, validate.csv and test.csv
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Save the fitted scaler parameters (bincode, or JSON for a .json path)
    #[arg(long)]
    save_scaler: Option<PathBuf>,

    /// Print the k best features of the training partition
    #[arg(long)]
    rank: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("wine_wrangle={},warn", level).into()),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => match args.preset {
            Preset::SeventyFifteen => PipelineConfig::seventy_fifteen_fifteen(),
            Preset::EightyTwenty => PipelineConfig::eighty_twenty(),
        },
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(column) = &args.stratify {
        config = config.with_stratify(column.clone());
    }

    let mut sources = WineSources::new(&args.red, &args.white)
        .with_delimiter(args.delimiter)
        .with_refresh_cache(args.refresh_cache);
    if let Some(cache) = &args.cache {
        sources = sources.with_cache(cache);
    }

    let output = WinePipeline::new(config).run_from_sources(&sources)?;

    println!(
        "train: {:>5} rows  validate: {:>5} rows  test: {:>5} rows  features: {}",
        output.train.n_samples(),
        output.validate.n_samples(),
        output.test.n_samples(),
        output.train.feature_names().len()
    );

    let baseline = mean_baseline(output.train.target.as_slice().unwrap_or(&[]))?;
    let target = output.validate.target.to_vec();
    if !target.is_empty() {
        let scores = baseline.score(&target)?;
        println!(
            "mean baseline ({:.3}) on validate: rmse {:.4}  mae {:.4}  r2 {:.4}",
            baseline.mean, scores.rmse, scores.mae, scores.r2
        );
    }

    if let Some(k) = args.rank {
        let train = output.train.reassemble()?;
        for (i, score) in select_k_best(&train, &output.train.target_name, k)?
            .iter()
            .enumerate()
        {
            println!("{:>2}. {:<30} F = {:.2}", i + 1, score.name, score.score);
        }
    }

    if let Some(dir) = &args.out_dir {
        output.write_csvs(dir)?;
        info!(dir = %dir.display(), "wrote partitions");
    }

    if let Some(path) = &args.save_scaler {
        match &output.scaler {
            Some(scaler) if path.extension().is_some_and(|ext| ext == "json") => {
                std::fs::write(path, params_to_json(&scaler.extract_params())?)?;
                info!(path = %path.display(), "saved scaler as json");
            }
            Some(scaler) => {
                scaler.save_to_file(path)?;
                info!(path = %path.display(), "saved scaler");
            }
            None => tracing::warn!("scaling is disabled; no scaler to save"),
        }
    }

    Ok(())
}
