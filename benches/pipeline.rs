use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wine_wrangle::cluster::KMeans;
use wine_wrangle::{train_validate_test_split, Column, Frame, PipelineConfig, SplitConfig, WinePipeline};

const COLUMNS: [(&str, f64, f64); 11] = [
    ("fixed_acidity", 3.8, 15.9),
    ("volatile_acidity", 0.08, 1.58),
    ("citric_acid", 0.0, 1.66),
    ("residual_sugar", 0.6, 65.8),
    ("chlorides", 0.009, 0.611),
    ("free_sulfur_dioxide", 1.0, 289.0),
    ("total_sulfur_dioxide", 6.0, 440.0),
    ("density", 0.987, 1.039),
    ("ph", 2.72, 4.01),
    ("sulphates", 0.22, 2.0),
    ("alcohol", 8.0, 14.9),
];

/// Uniform random table shaped like the merged wine data.
fn synthetic_wine(n: usize) -> Frame {
    let mut rng = StdRng::seed_from_u64(7);
    let mut columns: Vec<(String, Column)> = COLUMNS
        .iter()
        .map(|&(name, lo, hi)| {
            let values = (0..n).map(|_| rng.random_range(lo..hi)).collect();
            (name.to_string(), Column::Numeric(values))
        })
        .collect();
    columns.push((
        "quality".to_string(),
        Column::Numeric((0..n).map(|_| rng.random_range(3..=9) as f64).collect()),
    ));
    columns.push((
        "type".to_string(),
        Column::Categorical(
            (0..n)
                .map(|_| if rng.random::<f64>() < 0.25 { "red" } else { "white" }.to_string())
                .collect(),
        ),
    ));
    Frame::new(columns).expect("valid synthetic table")
}

fn bench_split(c: &mut Criterion) {
    for n in [1_000, 6_500, 20_000] {
        let frame = synthetic_wine(n);
        let plain = SplitConfig::eighty_twenty();
        let stratified = SplitConfig::eighty_twenty().with_stratify("type");

        c.bench_with_input(BenchmarkId::new("split", n), &frame, |b, frame| {
            b.iter(|| black_box(train_validate_test_split(frame, &plain).unwrap()));
        });
        c.bench_with_input(BenchmarkId::new("split_stratified", n), &frame, |b, frame| {
            b.iter(|| black_box(train_validate_test_split(frame, &stratified).unwrap()));
        });
    }
}

fn bench_kmeans(c: &mut Criterion) {
    for n in [1_000, 6_500] {
        let mut rng = StdRng::seed_from_u64(11);
        let data = Array2::from_shape_fn((n, 2), |_| rng.random::<f64>());
        let kmeans = KMeans::new(3).with_n_init(1);

        c.bench_with_input(BenchmarkId::new("kmeans_k3", n), &data, |b, data| {
            b.iter(|| black_box(kmeans.fit(data).unwrap()));
        });
    }
}

fn bench_full_pipeline(c: &mut Criterion) {
    let frame = synthetic_wine(6_500);
    let pipeline = WinePipeline::new(PipelineConfig::default());

    c.bench_function("pipeline_default_6500", |b| {
        b.iter(|| black_box(pipeline.run(black_box(&frame)).unwrap()));
    });
}

criterion_group!(benches, bench_split, bench_kmeans, bench_full_pipeline);
criterion_main!(benches);
