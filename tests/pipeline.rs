use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use wine_wrangle::features::DerivedFeature;
use wine_wrangle::frame::read_csv;
use wine_wrangle::preprocessing::{FittedScaler, FittedTransformer};
use wine_wrangle::{
    acquire_wine, PipelineConfig, SplitConfig, WinePipeline, WineSources, WrangleError,
};

const HEADER: &str = "\"fixed acidity\";\"volatile acidity\";\"citric acid\";\"residual sugar\";\
\"chlorides\";\"free sulfur dioxide\";\"total sulfur dioxide\";\"density\";\"pH\";\
\"sulphates\";\"alcohol\";\"quality\"";

/// Semicolon-separated sample file in the UCI layout.
fn write_samples(path: &Path, rows: usize, offset: usize) {
    let mut text = String::from(HEADER);
    text.push('\n');
    for i in offset..offset + rows {
        let density = if i == offset + 3 { 1.02 } else { 0.99 + (i % 7) as f64 * 0.001 };
        writeln!(
            text,
            "{};{};{};{};{};{};{};{};{};{};{};{}",
            6.0 + (i % 5) as f64 * 0.5,
            0.2 + (i % 3) as f64 * 0.1,
            0.1 + (i % 4) as f64 * 0.1,
            1.0 + (i % 9) as f64,
            0.04 + (i % 6) as f64 * 0.01,
            10 + (i % 8) * 5,
            40 + (i % 10) * 10,
            density,
            3.0 + (i % 5) as f64 * 0.1,
            0.4 + (i % 4) as f64 * 0.1,
            9.0 + (i % 11) as f64 * 0.4,
            [5, 6, 7][i % 3],
        )
        .unwrap();
    }
    fs::write(path, text).unwrap();
}

fn sources(dir: &Path) -> WineSources {
    let red = dir.join("winequality-red.csv");
    let white = dir.join("winequality-white.csv");
    write_samples(&red, 30, 0);
    write_samples(&white, 70, 1000);
    WineSources::new(red, white).with_delimiter(';')
}

#[test]
fn test_acquire_merges_and_tags() {
    let dir = tempfile::tempdir().unwrap();
    let frame = acquire_wine(&sources(dir.path())).unwrap();

    assert_eq!(frame.n_rows(), 100);
    for name in ["fixed_acidity", "free_sulfur_dioxide", "ph", "quality", "type"] {
        assert!(frame.contains(name), "missing {}", name);
    }
    let types = frame.categorical("type").unwrap();
    assert_eq!(types.iter().filter(|t| t.as_str() == "red").count(), 30);
    assert_eq!(types.iter().filter(|t| t.as_str() == "white").count(), 70);
}

#[test]
fn test_cache_is_written_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("wine.csv");
    let sources = sources(dir.path()).with_cache(&cache);

    let first = acquire_wine(&sources).unwrap();
    assert!(cache.exists());

    // The raw files are no longer needed once the cache exists.
    fs::remove_file(&sources.red).unwrap();
    let second = acquire_wine(&sources).unwrap();
    assert_eq!(second.names(), first.names());
    assert_eq!(second.n_rows(), first.n_rows());
    assert_eq!(second.numeric("quality").unwrap(), first.numeric("quality").unwrap());

    // Refreshing forces the raw files to be read again.
    assert!(matches!(
        acquire_wine(&sources.clone().with_refresh_cache(true)),
        Err(WrangleError::IoError(_))
    ));
}

#[test]
fn test_end_to_end_default() {
    let dir = tempfile::tempdir().unwrap();
    let output = WinePipeline::new(PipelineConfig::default())
        .run_from_sources(&sources(dir.path()))
        .unwrap();

    // Two rows exceed the density bound; 98 = 68 + 15 + 15.
    assert_eq!(output.train.n_samples(), 68);
    assert_eq!(output.validate.n_samples(), 15);
    assert_eq!(output.test.n_samples(), 15);

    let ids: Vec<usize> = [&output.train, &output.validate, &output.test]
        .iter()
        .flat_map(|xy| xy.row_ids().to_vec())
        .collect();
    let unique: HashSet<usize> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 98);

    let names = output.train.feature_names().to_vec();
    assert_eq!(output.validate.feature_names(), names.as_slice());
    assert_eq!(output.test.feature_names(), names.as_slice());
    assert!(names.contains(&"type_white".to_string()));

    let x = output.test.features_array().unwrap();
    assert_eq!(x.dim(), (15, names.len()));
}

#[test]
fn test_scaler_params_come_from_train_only() {
    let dir = tempfile::tempdir().unwrap();
    let sources = sources(dir.path());
    let output = WinePipeline::new(PipelineConfig::eighty_twenty())
        .run_from_sources(&sources)
        .unwrap();

    let Some(FittedScaler::MinMax(scaler)) = &output.scaler else {
        panic!("expected a min-max scaler");
    };

    // Recompute the raw training alcohol range from the acquired table.
    let raw = acquire_wine(&sources).unwrap();
    let alcohol = raw.numeric("alcohol").unwrap();
    let train_alcohol: Vec<f64> = output.train.row_ids().iter().map(|&i| alcohol[i]).collect();
    let lo = train_alcohol.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = train_alcohol.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let i = scaler.columns().iter().position(|c| c == "alcohol").unwrap();
    assert_eq!(scaler.min()[i], lo);
    assert_eq!(scaler.max()[i], hi);

    // Round trip through a params file.
    let path = dir.path().join("scaler.bin");
    scaler.save_to_file(&path).unwrap();
    let loaded = wine_wrangle::preprocessing::FittedMinMaxScaler::load_from_file(&path).unwrap();
    assert_eq!(&loaded, scaler);
}

#[test]
fn test_stratified_run_with_features() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::eighty_twenty()
        .with_features(DerivedFeature::ALL.to_vec())
        .with_split(SplitConfig::eighty_twenty().with_stratify("quality"));
    let output = WinePipeline::new(config)
        .run_from_sources(&sources(dir.path()))
        .unwrap();

    for xy in [&output.train, &output.validate, &output.test] {
        let n = xy.n_samples() as f64;
        for class in [5.0, 6.0, 7.0] {
            let count = xy.target.iter().filter(|&&q| q == class).count() as f64;
            let share_in_table = match class as i32 {
                // the density outliers are red row 3 (quality 5) and white row 1003 (quality 6)
                5 => 32.0 / 98.0,
                _ => 33.0 / 98.0,
            };
            assert!(
                (count - n * share_in_table).abs() <= 1.0 + 1e-9,
                "class {} has {} of {}",
                class,
                count,
                n
            );
        }
    }
    assert!(output
        .train
        .feature_names()
        .contains(&"sulfur_dioxide_index".to_string()));
}

#[test]
fn test_write_csvs() {
    let dir = tempfile::tempdir().unwrap();
    let output = WinePipeline::default()
        .run_from_sources(&sources(dir.path()))
        .unwrap();

    let out_dir = dir.path().join("prepared");
    output.write_csvs(&out_dir).unwrap();

    let train = read_csv(out_dir.join("train.csv"), b',').unwrap();
    assert_eq!(train.n_rows(), output.train.n_samples());
    assert!(train.contains("quality"));
    assert_eq!(train.n_cols(), output.train.feature_names().len() + 1);
    assert!(out_dir.join("validate.csv").exists());
    assert!(out_dir.join("test.csv").exists());
}

#[test]
fn test_schema_mismatch_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let sources = sources(dir.path());
    fs::write(&sources.white, "\"alcohol\";\"quality\";\"colour\"\n9.5;6;straw\n").unwrap();

    match acquire_wine(&sources) {
        Err(WrangleError::SchemaMismatch { only_in_white, .. }) => {
            assert_eq!(only_in_white, vec!["colour".to_string()]);
        }
        other => panic!("expected SchemaMismatch, got {:?}", other.map(|f| f.n_rows())),
    }
}
