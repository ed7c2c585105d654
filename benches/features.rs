//! Benchmarks for feature extraction and boosting.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{GrayImage, Luma};
use tumorscope::prelude::*;

fn scan(size: u32) -> GrayImage {
    GrayImage::from_fn(size, size, |x, y| {
        let v = match (x * 3 / size, y * 3 / size) {
            (1, 1) => 220,
            (0, _) | (_, 0) => 30,
            _ => 120,
        };
        Luma([v + ((x * 7 + y * 13) % 11) as u8])
    })
}

fn bench_extract_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_features");
    group.sample_size(20);

    for size in [32u32, 64, 128].iter() {
        let img = scan(*size);
        let config = FeatureConfig {
            n_clusters: 3,
            n_init: 10,
            seed: 42,
        };

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| extract_features(black_box(&img), &config).unwrap());
        });
    }

    group.finish();
}

fn bench_gbm_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("gbm_fit");
    group.sample_size(10);

    for n in [100usize, 400].iter() {
        let data: Vec<f32> = (0..n * 12).map(|i| ((i * 37) % 101) as f32).collect();
        let x = Matrix::from_vec(*n, 12, data).unwrap();
        let y: Vec<usize> = (0..*n).map(|i| usize::from(x.get(i, 4) > 50.0)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| {
                let mut gbm = GradientBoostingClassifier::new().with_n_estimators(100);
                gbm.fit(black_box(&x), black_box(&y)).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract_features, bench_gbm_fit);
criterion_main!(benches);
