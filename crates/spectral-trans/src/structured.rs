//! Inverse transform on structured grids.
//!
//! # Hemispheres
//!
//! Legendre functions with `n - m` even are symmetric about the equator and
//! those with `n - m` odd are antisymmetric, so the table only needs the
//! latitudes of the longer hemisphere:
//!
//! ```text
//! north row j          ← sym + asym   (table latitude nlats_leg − nlats_north + j)
//! south row nlats−1−j  ← sym − asym   (table latitude nlats_leg − nlats_south + j)
//! ```
//!
//! An equator row counts in both hemispheres. When the southern rows are not
//! mirror images of the northern ones (or vice versa) every row is tabulated
//! at its own latitude and treated as "northern".

use crate::config::TransConfig;
use crate::error::Result;
use crate::fourier::{coefficients_len, FourierBackend, FourierLayout};
use crate::legendre::LegendreTable;
use crate::linalg::GemmBackend;
use crate::spectra::{n_imag, num_n, spectral_index};
use nalgebra::{DMatrix, DMatrixView};
use sphere_grid::StructuredGrid;
use tracing::debug;

const MIRROR_TOLERANCE: f64 = 1e-9;

/// How grid rows map onto the latitudes of the Legendre table.
#[derive(Debug, Clone, PartialEq)]
pub struct Hemispheres {
    nlats: usize,
    nlats_north: usize,
    nlats_south: usize,
    /// Table latitudes in radians
    legendre_lats: Vec<f64>,
}

impl Hemispheres {
    pub fn new(grid: &StructuredGrid) -> Self {
        let lats: Vec<f64> = grid.rows().iter().map(|row| row.lat).collect();
        let nlats = lats.len();

        let north = lats.iter().filter(|&&lat| lat > 0.0).count();
        let equator = lats.iter().filter(|&&lat| lat == 0.0).count();
        let south = lats.iter().filter(|&&lat| lat < 0.0).count();
        let (north, south) = if equator > 0 {
            (north + 1, south + 1)
        } else {
            (north, south)
        };

        let nlats_leg = north.max(south);
        let leg_degrees: Vec<f64> = if north >= south {
            lats[..nlats_leg].to_vec()
        } else {
            (0..nlats_leg).map(|j| -lats[nlats - 1 - j]).collect()
        };

        let mirrored = equator <= 1
            && (0..north).all(|j| (lats[j] - leg_degrees[nlats_leg - north + j]).abs() <= MIRROR_TOLERANCE)
            && (0..south)
                .all(|j| (-lats[nlats - 1 - j] - leg_degrees[nlats_leg - south + j]).abs() <= MIRROR_TOLERANCE);

        if !mirrored {
            debug!(nlats, "Rows are not symmetric about the equator, tabulating every latitude");
            return Self {
                nlats,
                nlats_north: nlats,
                nlats_south: 0,
                legendre_lats: lats.iter().map(|lat| lat.to_radians()).collect(),
            };
        }

        Self {
            nlats,
            nlats_north: north,
            nlats_south: south,
            legendre_lats: leg_degrees.iter().map(|lat| lat.to_radians()).collect(),
        }
    }

    pub fn nlats(&self) -> usize {
        self.nlats
    }

    pub fn nlats_north(&self) -> usize {
        self.nlats_north
    }

    pub fn nlats_south(&self) -> usize {
        self.nlats_south
    }

    /// Number of tabulated latitudes.
    pub fn nlats_leg(&self) -> usize {
        self.legendre_lats.len()
    }

    pub fn legendre_lats(&self) -> &[f64] {
        &self.legendre_lats
    }

    /// `(row, table latitude)` for rows taking `sym + asym`.
    pub fn north_rows(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let offset = self.nlats_leg() - self.nlats_north;
        (0..self.nlats_north).map(move |j| (j, offset + j))
    }

    /// `(row, table latitude)` for rows taking `sym - asym`.
    pub fn south_rows(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let offset = self.nlats_leg() - self.nlats_south;
        (0..self.nlats_south).map(move |j| (self.nlats - 1 - j, offset + j))
    }
}

/// Largest `n <= truncation` with `n - m` of the given parity.
fn first_n(truncation: usize, m: usize, antisymmetric: bool) -> usize {
    truncation - (truncation - m + antisymmetric as usize) % 2
}

/// Multiply the spectra of one zonal wavenumber against a table block.
///
/// Returns a `nb_fields·n_imag × nlats_leg` matrix with row
/// `field + nb_fields·part`.
#[allow(clippy::too_many_arguments)]
fn legendre_block(
    block: &[f64],
    table_truncation: usize,
    call_truncation: usize,
    m: usize,
    antisymmetric: bool,
    nb_fields: usize,
    nlats_leg: usize,
    spectra: &[f64],
    gemm: GemmBackend,
) -> DMatrix<f64> {
    let size = num_n(table_truncation, m, !antisymmetric);
    let rows = nb_fields * n_imag(m);
    let top = first_n(table_truncation, m, antisymmetric);

    let a = DMatrix::from_fn(rows, size, |r, k| {
        let n = top - 2 * k;
        if n > call_truncation || m > call_truncation {
            return 0.0;
        }
        spectra[spectral_index(call_truncation, nb_fields, m, n, r / nb_fields, r % nb_fields)]
    });
    let b = DMatrixView::from_slice(block, size, nlats_leg);
    let mut c = DMatrix::zeros(rows, nlats_leg);
    gemm.gemm(&a, &b, &mut c);
    c
}

/// Legendre stage: spectra at `call_truncation` to Fourier coefficients for
/// wavenumbers `0..=truncation` on every row.
///
/// `coefficients` must be zeroed and hold
/// `coefficients_len(truncation, nb_fields, nlats)` values.
#[allow(clippy::too_many_arguments)]
pub fn legendre_stage(
    hemispheres: &Hemispheres,
    table: &LegendreTable,
    truncation: usize,
    call_truncation: usize,
    nb_fields: usize,
    spectra: &[f64],
    layout: FourierLayout,
    gemm: GemmBackend,
    coefficients: &mut [f64],
) {
    let nlats = hemispheres.nlats();
    let nlats_leg = hemispheres.nlats_leg();
    let table_truncation = table.truncation();
    debug_assert!(table_truncation > truncation);
    debug_assert_eq!(coefficients.len(), coefficients_len(truncation, nb_fields, nlats));

    for m in 0..=truncation {
        let sym = legendre_block(
            table.sym_block(m),
            table_truncation,
            call_truncation,
            m,
            false,
            nb_fields,
            nlats_leg,
            spectra,
            gemm,
        );
        let asym = legendre_block(
            table.asym_block(m),
            table_truncation,
            call_truncation,
            m,
            true,
            nb_fields,
            nlats_leg,
            spectra,
            gemm,
        );

        for r in 0..nb_fields * n_imag(m) {
            let (part, field) = (r / nb_fields, r % nb_fields);
            for (row, leg) in hemispheres.north_rows() {
                coefficients[layout.index(truncation, nb_fields, nlats, m, part, row, field)] =
                    sym[(r, leg)] + asym[(r, leg)];
            }
            for (row, leg) in hemispheres.south_rows() {
                coefficients[layout.index(truncation, nb_fields, nlats, m, part, row, field)] =
                    sym[(r, leg)] - asym[(r, leg)];
            }
        }
    }
}

/// Precomputed state for a structured grid.
#[derive(Debug)]
pub struct StructuredTrans {
    grid: StructuredGrid,
    truncation: usize,
    hemispheres: Hemispheres,
    legendre: LegendreTable,
    fourier: FourierBackend,
    gemm: GemmBackend,
}

impl StructuredTrans {
    pub fn new(grid: &StructuredGrid, truncation: usize, config: &TransConfig) -> Result<Self> {
        let hemispheres = Hemispheres::new(grid);
        let legendre = LegendreTable::new(truncation + 1, hemispheres.legendre_lats());
        let fourier = FourierBackend::new(
            grid,
            truncation,
            config.fourier,
            config.fft_threshold,
            config.gemm_backend,
        )?;

        debug!(
            grid = grid.name(),
            truncation,
            nlats_leg = hemispheres.nlats_leg(),
            fourier = fourier.name(),
            "Structured transform ready"
        );

        Ok(Self {
            grid: grid.clone(),
            truncation,
            hemispheres,
            legendre,
            fourier,
            gemm: config.gemm_backend,
        })
    }

    pub fn grid(&self) -> &StructuredGrid {
        &self.grid
    }

    pub fn hemispheres(&self) -> &Hemispheres {
        &self.hemispheres
    }

    pub fn fourier(&self) -> &FourierBackend {
        &self.fourier
    }

    /// Spectra at `call_truncation` (the engine truncation, or one more for
    /// winds) to grid values. Buffers are assumed validated.
    pub fn invtrans(&self, call_truncation: usize, nb_fields: usize, spectra: &[f64], gp: &mut [f64]) {
        let mut coefficients = vec![0.0; coefficients_len(self.truncation, nb_fields, self.grid.ny())];
        {
            let _span = tracing::debug_span!("legendre", nb_fields).entered();
            legendre_stage(
                &self.hemispheres,
                &self.legendre,
                self.truncation,
                call_truncation,
                nb_fields,
                spectra,
                self.fourier.layout(),
                self.gemm,
                &mut coefficients,
            );
        }

        let _span = tracing::debug_span!("fourier", nb_fields, backend = self.fourier.name()).entered();
        self.fourier.synthesize(&self.grid, nb_fields, &coefficients, gp);
    }
}
