//! Time inverse transforms on a named grid.
//!
//! Builds a transform for the requested grid and truncation, then runs the
//! scalar (and optionally wind) inversion a number of times and reports
//! setup and per-call timings.
//!
//! Run with: cargo run --release --bin invtrans-bench -- --grid O320 --truncation 319

use anyhow::{Context, Result};
use clap::Parser;
use spectral_trans::{spectral_index, FourierMethod, GemmBackend, Trans, TransConfig};
use sphere_grid::{Grid, UnstructuredGrid};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "invtrans-bench")]
#[command(about = "Benchmark inverse spherical-harmonic transforms")]
struct Args {
    /// Grid name (F32, O32, L64x33, S64x32, ...)
    #[arg(short, long, default_value = "O32")]
    grid: String,

    /// Spectral truncation
    #[arg(short, long, default_value_t = 31)]
    truncation: usize,

    /// Number of scalar fields
    #[arg(short, long, default_value_t = 1)]
    fields: usize,

    /// Number of vorticity/divergence pairs
    #[arg(long, default_value_t = 0)]
    vordiv: usize,

    /// Fourier synthesis (auto, fft, dense1, dense2)
    #[arg(long, env = "TRANS_FOURIER")]
    fourier: Option<String>,

    /// Matrix multiply backend (nalgebra, generic)
    #[arg(long, env = "TRANS_GEMM_BACKEND")]
    gemm: Option<String>,

    /// Treat the grid as an unstructured point set
    #[arg(long)]
    unstructured: bool,

    /// Compute Legendre values on the fly for unstructured grids
    #[arg(long)]
    no_precompute: bool,

    /// Number of timed iterations
    #[arg(short, long, default_value_t = 10)]
    iterations: usize,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).with_target(true).init();

    let mut config = TransConfig::from_env();
    if let Some(fourier) = &args.fourier {
        config.fourier = FourierMethod::from_str(fourier);
    }
    if let Some(gemm) = &args.gemm {
        config.gemm_backend = GemmBackend::from_str(gemm);
    }
    if args.no_precompute {
        config.precompute = false;
    }

    info!(grid = %args.grid, truncation = args.truncation, unstructured = args.unstructured, "Building transform");

    let start = Instant::now();
    let trans = if args.unstructured {
        let grid = match Grid::from_name(&args.grid).with_context(|| format!("Unknown grid {}", args.grid))? {
            Grid::Structured(structured) => Grid::Unstructured(UnstructuredGrid::from_structured(&structured)),
            grid => grid,
        };
        Trans::new(grid, args.truncation, config)
    } else {
        Trans::from_name(&args.grid, args.truncation, config)
    }
    .context("Failed to build transform")?;
    let setup = start.elapsed();

    let scalar = synthetic_spectra(args.truncation, args.fields);
    let vorticity = synthetic_spectra(args.truncation, args.vordiv);
    let divergence: Vec<f64> = vorticity.iter().map(|v| 0.1 * v).collect();
    let mut gp = vec![0.0; trans.grid_len(args.fields + 2 * args.vordiv)];

    let iterations = args.iterations.max(1);
    let start = Instant::now();
    for _ in 0..iterations {
        trans.invtrans_mixed(args.fields, &scalar, args.vordiv, &vorticity, &divergence, &mut gp)?;
    }
    let per_call = start.elapsed() / iterations as u32;

    let finite = gp.iter().filter(|v| v.is_finite()).count();

    println!("Inverse transform benchmark");
    println!("{:-<50}", "");
    println!("{:<22} {}", "Grid", trans.grid().name());
    println!("{:<22} {}", "Points", trans.grid().size());
    println!("{:<22} {}", "Truncation", trans.truncation());
    println!("{:<22} {}", "Fourier", trans.fourier_backend().unwrap_or("pointwise"));
    println!("{:<22} {}", "Gemm", trans.config().gemm_backend);
    println!("{:<22} {} + {} wind pairs", "Fields", args.fields, args.vordiv);
    println!("{:-<50}", "");
    println!("{:<22} {:>10.2} ms", "Setup", setup.as_secs_f64() * 1e3);
    println!("{:<22} {:>10.2} ms", "Per call", per_call.as_secs_f64() * 1e3);
    println!("{:<22} {:>10}/{}", "Finite values", finite, gp.len());

    Ok(())
}

/// Spectra with amplitudes falling off with total wavenumber.
fn synthetic_spectra(truncation: usize, nb_fields: usize) -> Vec<f64> {
    let mut spectra = vec![0.0; spectral_trans::spectral_len(truncation, nb_fields)];
    for m in 0..=truncation {
        for n in m..=truncation {
            for part in 0..2 {
                for field in 0..nb_fields {
                    let k = spectral_index(truncation, nb_fields, m, n, part, field);
                    let phase = ((k * 7919) % 1000) as f64 / 1000.0 - 0.5;
                    spectra[k] = phase / (n as f64 + 1.0);
                }
            }
        }
    }
    spectra
}
