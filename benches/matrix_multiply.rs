//! Benchmarks comparing the six multiplication implementations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use csrmult::{generate, multiply, Algorithm, SparseMatrixCSR};

/// Shapes and densities, from a tiny square to a large sparse chain
const CASES: &[(&str, usize, usize, usize, f64)] = &[
    ("10x10", 10, 10, 10, 0.1),
    ("300x500x300", 300, 500, 300, 0.01),
    ("1000x1000-sparse", 1000, 1000, 1000, 0.001),
    ("1000x1000", 1000, 1000, 1000, 0.01),
];

fn operands(m: usize, k: usize, n: usize, density: f64) -> (SparseMatrixCSR<f32>, SparseMatrixCSR<f32>) {
    let a = generate(m, k, density, 1).expect("benchmark shapes are non-zero");
    let b = generate(k, n, density, 2).expect("benchmark shapes are non-zero");
    (a, b)
}

fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("spgemm");
    group.sample_size(20);

    for &(name, m, k, n, density) in CASES {
        let (a, b) = operands(m, k, n, density);

        for algorithm in Algorithm::ALL {
            // The dense kernel is cubic; keep it to the small cases
            if algorithm == Algorithm::Dense && m * k * n > 50_000_000 {
                continue;
            }

            group.bench_with_input(
                BenchmarkId::new(format!("V{}", algorithm.id()), name),
                &(&a, &b),
                |bench, (a, b)| bench.iter(|| black_box(multiply(a, b, algorithm).unwrap())),
            );
        }
    }

    group.finish();
}

fn bench_threaded_threshold(c: &mut Criterion) {
    // Just above the default nnz threshold so the main kernel spawns threads
    let (a, b) = operands(2000, 2000, 2000, 0.003);

    c.bench_function("main-threaded-2000", |bench| {
        bench.iter(|| black_box(multiply(&a, &b, Algorithm::Main).unwrap()))
    });
    c.bench_function("predicted-2000", |bench| {
        bench.iter(|| black_box(multiply(&a, &b, Algorithm::Predicted).unwrap()))
    });
}

criterion_group!(benches, bench_algorithms, bench_threaded_threshold);
criterion_main!(benches);
