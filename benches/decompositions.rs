use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use densela::DenseMatrix;

// ---------------------------------------------------------------------------
// Helpers: deterministic well-conditioned inputs
// ---------------------------------------------------------------------------

const SIZES: [usize; 3] = [4, 16, 64];

fn entry(i: usize, j: usize) -> f64 {
    ((i * 7 + j * 3) % 11) as f64 - 5.0 + if i == j { 20.0 } else { 0.0 }
}

fn densela_general(n: usize) -> DenseMatrix<f64> {
    DenseMatrix::from_fn(n, n, entry)
}

fn nalgebra_general(n: usize) -> nalgebra::DMatrix<f64> {
    nalgebra::DMatrix::from_fn(n, n, entry)
}

fn densela_symmetric(n: usize) -> DenseMatrix<f64> {
    DenseMatrix::from_fn(n, n, |i, j| entry(i, j) + entry(j, i))
}

fn nalgebra_symmetric(n: usize) -> nalgebra::DMatrix<f64> {
    nalgebra::DMatrix::from_fn(n, n, |i, j| entry(i, j) + entry(j, i))
}

// ---------------------------------------------------------------------------
// LU
// ---------------------------------------------------------------------------

fn lu(c: &mut Criterion) {
    let mut g = c.benchmark_group("lu");
    for n in SIZES {
        let a = densela_general(n);
        g.bench_with_input(BenchmarkId::new("densela", n), &a, |b, a| {
            b.iter(|| black_box(a).lu())
        });
        let a = nalgebra_general(n);
        g.bench_with_input(BenchmarkId::new("nalgebra", n), &a, |b, a| {
            b.iter(|| black_box(a).clone().lu())
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// Column-pivoted QR
// ---------------------------------------------------------------------------

fn qr(c: &mut Criterion) {
    let mut g = c.benchmark_group("qr_pivoted");
    for n in SIZES {
        let a = densela_general(n);
        g.bench_with_input(BenchmarkId::new("densela", n), &a, |b, a| {
            b.iter(|| black_box(a).qr())
        });
        let a = nalgebra_general(n);
        g.bench_with_input(BenchmarkId::new("nalgebra", n), &a, |b, a| {
            b.iter(|| black_box(a).clone().col_piv_qr())
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// SVD
// ---------------------------------------------------------------------------

fn svd(c: &mut Criterion) {
    let mut g = c.benchmark_group("svd");
    for n in SIZES {
        let a = densela_general(n);
        g.bench_with_input(BenchmarkId::new("densela", n), &a, |b, a| {
            b.iter(|| black_box(a).svd())
        });
        g.bench_with_input(BenchmarkId::new("densela_values_only", n), &a, |b, a| {
            b.iter(|| densela::Svd::singular_values_only(black_box(a)))
        });
        let a = nalgebra_general(n);
        g.bench_with_input(BenchmarkId::new("nalgebra", n), &a, |b, a| {
            b.iter(|| black_box(a).clone().svd(true, true))
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// Symmetric eigen
// ---------------------------------------------------------------------------

fn symmetric_eigen(c: &mut Criterion) {
    let mut g = c.benchmark_group("symmetric_eigen");
    for n in SIZES {
        let a = densela_symmetric(n);
        g.bench_with_input(BenchmarkId::new("densela", n), &a, |b, a| {
            b.iter(|| black_box(a).eig_symmetric())
        });
        let a = nalgebra_symmetric(n);
        g.bench_with_input(BenchmarkId::new("nalgebra", n), &a, |b, a| {
            b.iter(|| black_box(a).clone().symmetric_eigen())
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// Hermitian eigen
// ---------------------------------------------------------------------------

fn hermitian_eigen(c: &mut Criterion) {
    use densela::Complex;

    let mut g = c.benchmark_group("hermitian_eigen");
    for n in SIZES {
        // Antisymmetric imaginary part keeps the matrix Hermitian.
        let a = DenseMatrix::from_fn(n, n, |i, j| {
            Complex::new(entry(i, j) + entry(j, i), entry(i, j) - entry(j, i))
        });
        g.bench_with_input(BenchmarkId::new("densela", n), &a, |b, a| {
            b.iter(|| black_box(a).eig_hermitian())
        });
    }
    g.finish();
}

criterion_group!(benches, lu, qr, svd, symmetric_eigen, hermitian_eigen);
criterion_main!(benches);
