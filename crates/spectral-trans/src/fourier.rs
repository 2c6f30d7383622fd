//! Fourier synthesis along latitude rows.
//!
//! The Legendre stage leaves, for every row, field and zonal wavenumber
//! `m <= T`, a complex Fourier coefficient `c = re + i·im`. A row value at
//! longitude `λ` is
//!
//! ```text
//! f(λ) = Σₘ kₘ · (re · cos(mλ) − im · sin(mλ)),   k₀ = 1, kₘ = 2
//! ```
//!
//! Two strategies evaluate the sum:
//!
//! - **FFT**: an inverse FFT over the full circle the row was cut from,
//!   followed by picking the row's window. Wavenumbers beyond the circle's
//!   resolution fold onto their aliases, so the FFT reproduces the direct sum
//!   at the grid longitudes.
//! - **Dense**: a precomputed `cos`/`sin` basis per distinct row shape,
//!   multiplied against the coefficients. Two orientations are available and
//!   each expects its own coefficient layout (see [`FourierLayout`]).

use crate::config::FourierMethod;
use crate::error::{Result, TransError};
use crate::linalg::GemmBackend;
use nalgebra::{DMatrix, DMatrixView};
use num_complex::Complex;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};
use sphere_grid::{LatitudeRow, StructuredGrid};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Placement of Fourier coefficients in the buffer shared by the Legendre
/// and Fourier stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FourierLayout {
    /// `part + 2·(m + (T+1)·(row + nlats·field))`
    ///
    /// A column-major `2(T+1) × nlats·nb_fields` matrix.
    Canonical,
    /// `field + nb_fields·(row + nlats·(part + 2·m))`
    ///
    /// A column-major `nb_fields·nlats × 2(T+1)` matrix.
    Transposed,
}

impl FourierLayout {
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn index(
        &self,
        truncation: usize,
        nb_fields: usize,
        nlats: usize,
        m: usize,
        part: usize,
        row: usize,
        field: usize,
    ) -> usize {
        match self {
            Self::Canonical => part + 2 * (m + (truncation + 1) * (row + nlats * field)),
            Self::Transposed => field + nb_fields * (row + nlats * (part + 2 * m)),
        }
    }
}

/// Number of values in a Fourier coefficient buffer.
pub fn coefficients_len(truncation: usize, nb_fields: usize, nlats: usize) -> usize {
    2 * (truncation + 1) * nlats * nb_fields
}

/// Fourier synthesis strategy, chosen once per engine.
pub enum FourierBackend {
    Fft(FftSynthesis),
    Dense(DenseSynthesis),
}

impl FourierBackend {
    /// Select and prepare the synthesis for `grid`.
    ///
    /// With [`FourierMethod::Auto`] the dense synthesis is used when the
    /// widest row covers less than `fft_threshold` of the widest circle, or
    /// when some row does not sit on the longitudes of its circle.
    pub fn new(
        grid: &StructuredGrid,
        truncation: usize,
        method: FourierMethod,
        fft_threshold: f64,
        gemm: GemmBackend,
    ) -> Result<Self> {
        let dense = |layout| Self::Dense(DenseSynthesis::new(grid, truncation, layout, gemm));
        let backend = match method {
            FourierMethod::Fft => Self::Fft(FftSynthesis::new(grid, truncation)?),
            FourierMethod::Dense => dense(FourierLayout::Canonical),
            FourierMethod::DenseTransposed => dense(FourierLayout::Transposed),
            FourierMethod::Auto => {
                if (grid.nxmax() as f64) < fft_threshold * grid.global_nxmax() as f64 {
                    dense(FourierLayout::Canonical)
                } else {
                    match FftSynthesis::new(grid, truncation) {
                        Ok(fft) => Self::Fft(fft),
                        Err(err) => {
                            debug!(error = %err, "FFT unavailable, using dense Fourier synthesis");
                            dense(FourierLayout::Canonical)
                        }
                    }
                }
            }
        };
        Ok(backend)
    }

    /// Coefficient layout the backend reads.
    pub fn layout(&self) -> FourierLayout {
        match self {
            Self::Fft(_) => FourierLayout::Canonical,
            Self::Dense(dense) => dense.layout,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fft(_) => "fft",
            Self::Dense(dense) => match dense.layout {
                FourierLayout::Canonical => "dense2",
                FourierLayout::Transposed => "dense1",
            },
        }
    }

    /// Write `nb_fields` fields of grid values into `gp` (field-major, then
    /// row, then longitude) from coefficients in [`Self::layout`].
    pub fn synthesize(
        &self,
        grid: &StructuredGrid,
        nb_fields: usize,
        coefficients: &[f64],
        gp: &mut [f64],
    ) {
        debug_assert_eq!(gp.len(), nb_fields * grid.size());
        match self {
            Self::Fft(fft) => fft.synthesize(grid, nb_fields, coefficients, gp),
            Self::Dense(dense) => dense.synthesize(grid, nb_fields, coefficients, gp),
        }
    }
}

impl std::fmt::Debug for FourierBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Offset of a row's first point on its global circle.
fn circle_offset(row: &LatitudeRow) -> Option<usize> {
    let steps = (row.lon_first - row.lon_origin) / row.dlon();
    let rounded = steps.round();
    if (steps - rounded).abs() > 1e-6 {
        return None;
    }
    Some((rounded as i64).rem_euclid(row.global_nx as i64) as usize)
}

/// Inverse FFT synthesis on full longitude circles.
pub struct FftSynthesis {
    truncation: usize,
    plans: Vec<Arc<dyn Fft<f64>>>,
    row_plan: Vec<usize>,
    /// Offset of each row's first point on its circle
    jlon_min: Vec<usize>,
    /// Longitude of point 0 of each row's circle (radians)
    origin: Vec<f64>,
    max_len: usize,
    scratch_len: usize,
}

impl FftSynthesis {
    pub fn new(grid: &StructuredGrid, truncation: usize) -> Result<Self> {
        let _span = tracing::debug_span!("precompute fft", grid = grid.name()).entered();

        let mut planner = FftPlanner::<f64>::new();
        let mut plan_index: HashMap<usize, usize> = HashMap::new();
        let mut plans: Vec<Arc<dyn Fft<f64>>> = Vec::new();
        let mut row_plan = Vec::with_capacity(grid.ny());
        let mut jlon_min = Vec::with_capacity(grid.ny());
        let mut origin = Vec::with_capacity(grid.ny());

        for (j, row) in grid.rows().iter().enumerate() {
            let offset = circle_offset(row).ok_or_else(|| {
                TransError::config(format!(
                    "row {} starts at longitude {} which is not on its circle of {} points from {}",
                    j, row.lon_first, row.global_nx, row.lon_origin
                ))
            })?;
            jlon_min.push(offset);
            origin.push(row.lon_origin.to_radians());

            let index = *plan_index.entry(row.global_nx).or_insert_with(|| {
                plans.push(planner.plan_fft_inverse(row.global_nx));
                plans.len() - 1
            });
            row_plan.push(index);
        }

        let max_len = grid.global_nxmax();
        let scratch_len = plans
            .iter()
            .map(|plan| plan.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);

        debug!(plans = plans.len(), max_len, "FFT plans ready");

        Ok(Self {
            truncation,
            plans,
            row_plan,
            jlon_min,
            origin,
            max_len,
            scratch_len,
        })
    }

    fn synthesize(&self, grid: &StructuredGrid, nb_fields: usize, coefficients: &[f64], gp: &mut [f64]) {
        let npts = grid.size();
        let nlats = grid.ny();
        let t = self.truncation;
        let layout = FourierLayout::Canonical;
        let zero = Complex::new(0.0, 0.0);

        gp.par_chunks_mut(npts)
            .take(nb_fields)
            .enumerate()
            .for_each(|(field, gp_field)| {
                let mut buffer = vec![zero; self.max_len];
                let mut scratch = vec![zero; self.scratch_len];

                for (j, row) in grid.rows().iter().enumerate() {
                    let g = row.global_nx;
                    let plan = &self.plans[self.row_plan[j]];
                    let circle = &mut buffer[..g];
                    circle.fill(zero);

                    for m in 0..=t {
                        let re = coefficients[layout.index(t, nb_fields, nlats, m, 0, j, field)];
                        let (factor, im) = if m == 0 {
                            (1.0, 0.0)
                        } else {
                            (2.0, coefficients[layout.index(t, nb_fields, nlats, m, 1, j, field)])
                        };
                        let phase = Complex::from_polar(factor, m as f64 * self.origin[j]);
                        circle[m % g] += Complex::new(re, im) * phase;
                    }

                    plan.process_with_scratch(circle, &mut scratch[..plan.get_inplace_scratch_len()]);

                    let offset = grid.row_offset(j);
                    let jlon_min = self.jlon_min[j];
                    for (i, value) in gp_field[offset..offset + row.nx].iter_mut().enumerate() {
                        *value = circle[(i + jlon_min) % g].re;
                    }
                }
            });
    }
}

/// Dense synthesis with precomputed `cos`/`sin` bases.
pub struct DenseSynthesis {
    truncation: usize,
    layout: FourierLayout,
    gemm: GemmBackend,
    /// One basis per distinct row shape: `nx × 2(T+1)` for the canonical
    /// layout, `2(T+1) × nx` for the transposed one
    bases: Vec<DMatrix<f64>>,
    row_basis: Vec<usize>,
    regular: bool,
}

impl DenseSynthesis {
    pub fn new(grid: &StructuredGrid, truncation: usize, layout: FourierLayout, gemm: GemmBackend) -> Self {
        let _span = tracing::debug_span!("precompute fourier", grid = grid.name()).entered();

        let mut shape_index: HashMap<(usize, usize, u64), usize> = HashMap::new();
        let mut bases = Vec::new();
        let mut row_basis = Vec::with_capacity(grid.ny());

        for row in grid.rows() {
            let key = (row.nx, row.global_nx, row.lon_first.to_bits());
            let index = *shape_index.entry(key).or_insert_with(|| {
                bases.push(fourier_basis(row, truncation, layout));
                bases.len() - 1
            });
            row_basis.push(index);
        }

        debug!(bases = bases.len(), layout = ?layout, "Fourier bases ready");

        Self {
            truncation,
            layout,
            gemm,
            bases,
            row_basis,
            regular: grid.is_regular(),
        }
    }

    fn synthesize(&self, grid: &StructuredGrid, nb_fields: usize, coefficients: &[f64], gp: &mut [f64]) {
        let nlats = grid.ny();
        let npts = grid.size();
        let nm = 2 * (self.truncation + 1);

        if self.regular {
            let basis = &self.bases[0];
            let nx = grid.row(0).nx;
            match self.layout {
                FourierLayout::Canonical => {
                    let coefs = DMatrixView::from_slice(coefficients, nm, nlats * nb_fields);
                    let mut out = DMatrix::zeros(nx, nlats * nb_fields);
                    self.gemm.gemm(basis, &coefs, &mut out);
                    gp.copy_from_slice(out.as_slice());
                }
                FourierLayout::Transposed => {
                    let coefs = DMatrixView::from_slice(coefficients, nb_fields * nlats, nm);
                    let mut out = DMatrix::zeros(nb_fields * nlats, nx);
                    self.gemm.gemm(&coefs, basis, &mut out);
                    for field in 0..nb_fields {
                        for j in 0..nlats {
                            let start = field * npts + j * nx;
                            for (i, value) in gp[start..start + nx].iter_mut().enumerate() {
                                *value = out[(field + nb_fields * j, i)];
                            }
                        }
                    }
                }
            }
            return;
        }

        let t = self.truncation;
        for (j, row) in grid.rows().iter().enumerate() {
            let basis = &self.bases[self.row_basis[j]];
            let offset = grid.row_offset(j);
            let nx = row.nx;
            match self.layout {
                FourierLayout::Canonical => {
                    let gathered = DMatrix::from_fn(nm, nb_fields, |k, field| {
                        coefficients[self.layout.index(t, nb_fields, nlats, k / 2, k % 2, j, field)]
                    });
                    let mut out = DMatrix::zeros(nx, nb_fields);
                    self.gemm.gemm(basis, &gathered, &mut out);
                    let values = out.as_slice();
                    for field in 0..nb_fields {
                        let start = field * npts + offset;
                        gp[start..start + nx].copy_from_slice(&values[field * nx..(field + 1) * nx]);
                    }
                }
                FourierLayout::Transposed => {
                    let gathered = DMatrix::from_fn(nb_fields, nm, |field, k| {
                        coefficients[self.layout.index(t, nb_fields, nlats, k / 2, k % 2, j, field)]
                    });
                    let mut out = DMatrix::zeros(nb_fields, nx);
                    self.gemm.gemm(&gathered, basis, &mut out);
                    for field in 0..nb_fields {
                        let start = field * npts + offset;
                        for (i, value) in gp[start..start + nx].iter_mut().enumerate() {
                            *value = out[(field, i)];
                        }
                    }
                }
            }
        }
    }
}

/// `cos`/`sin` basis of one row, with the synthesis factors folded in.
fn fourier_basis(row: &LatitudeRow, truncation: usize, layout: FourierLayout) -> DMatrix<f64> {
    let nm = 2 * (truncation + 1);
    let value = |i: usize, k: usize| {
        let m = k / 2;
        let factor = if m == 0 { 1.0 } else { 2.0 };
        let angle = m as f64 * row.lon(i).to_radians();
        if k % 2 == 0 {
            factor * angle.cos()
        } else {
            -factor * angle.sin()
        }
    };
    match layout {
        FourierLayout::Canonical => DMatrix::from_fn(row.nx, nm, value),
        FourierLayout::Transposed => DMatrix::from_fn(nm, row.nx, |k, i| value(i, k)),
    }
}
