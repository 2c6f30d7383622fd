//! Benchmarks for inverse spectral transforms.
//!
//! Run with: cargo bench --package spectral-trans
//! Or: cargo bench --package spectral-trans --bench invtrans_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use spectral_trans::{FourierMethod, GemmBackend, Trans, TransConfig};
use sphere_grid::{Grid, UnstructuredGrid};
use test_utils::{random_spectra, structured};

fn build(grid: impl Into<Grid>, truncation: usize, config: TransConfig) -> Trans {
    Trans::new(grid.into(), truncation, config).expect("Failed to build transform")
}

// =============================================================================
// SETUP BENCHMARKS
// =============================================================================

fn bench_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("setup");
    group.sample_size(20);

    for (name, truncation) in [("O32", 31), ("O64", 63)] {
        let grid = structured(name);
        group.bench_with_input(BenchmarkId::new("structured", name), &grid, |b, grid| {
            b.iter(|| build(black_box(grid.clone()), truncation, TransConfig::default()))
        });
    }

    let points = UnstructuredGrid::from_structured(&structured("O32"));
    group.bench_function("unstructured_precompute_O32", |b| {
        b.iter(|| build(black_box(points.clone()), 31, TransConfig::default()))
    });

    group.finish();
}

// =============================================================================
// FOURIER BACKEND BENCHMARKS
// =============================================================================

fn bench_fourier_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("fourier_backends");
    let truncation = 63;
    let nb_fields = 4;
    let grid = structured("O64");
    let spectra = random_spectra(truncation, nb_fields, 1);
    group.throughput(Throughput::Elements((grid.size() * nb_fields) as u64));

    for method in [FourierMethod::Fft, FourierMethod::Dense, FourierMethod::DenseTransposed] {
        let trans = build(grid.clone(), truncation, TransConfig::default().with_fourier(method));
        let mut gp = vec![0.0; trans.grid_len(nb_fields)];
        group.bench_function(method.as_str(), |b| {
            b.iter(|| trans.invtrans(nb_fields, black_box(&spectra), &mut gp))
        });
    }

    group.finish();
}

// =============================================================================
// GEMM BACKEND BENCHMARKS
// =============================================================================

fn bench_gemm_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemm_backends");
    let truncation = 47;
    let grid = structured("F48");
    let spectra = random_spectra(truncation, 2, 2);

    for backend in [GemmBackend::Nalgebra, GemmBackend::Generic] {
        let trans = build(grid.clone(), truncation, TransConfig::default().with_gemm_backend(backend));
        let mut gp = vec![0.0; trans.grid_len(2)];
        group.bench_function(backend.as_str(), |b| {
            b.iter(|| trans.invtrans(2, black_box(&spectra), &mut gp))
        });
    }

    group.finish();
}

// =============================================================================
// WIND AND UNSTRUCTURED BENCHMARKS
// =============================================================================

fn bench_winds(c: &mut Criterion) {
    let truncation = 63;
    let trans = build(structured("O64"), truncation, TransConfig::default());
    let vorticity = random_spectra(truncation, 1, 3);
    let divergence = random_spectra(truncation, 1, 4);
    let mut gp = vec![0.0; trans.grid_len(2)];

    c.bench_function("vordiv2wind_O64", |b| {
        b.iter(|| trans.invtrans_vordiv2wind(1, black_box(&vorticity), black_box(&divergence), &mut gp))
    });
}

fn bench_unstructured(c: &mut Criterion) {
    let mut group = c.benchmark_group("unstructured");
    let truncation = 31;
    let points = UnstructuredGrid::from_structured(&structured("O32"));
    let spectra = random_spectra(truncation, 1, 5);

    for precompute in [true, false] {
        let trans = build(points.clone(), truncation, TransConfig::default().with_precompute(precompute));
        let mut gp = vec![0.0; trans.grid_len(1)];
        let label = if precompute { "precomputed" } else { "on_the_fly" };
        group.bench_function(label, |b| b.iter(|| trans.invtrans(1, black_box(&spectra), &mut gp)));
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_setup,
    bench_fourier_backends,
    bench_gemm_backends,
    bench_winds,
    bench_unstructured
);
criterion_main!(benches);
