//! Inverse transform on unstructured point sets.
//!
//! Every point is treated on its own: Legendre sums per zonal wavenumber
//! followed by a direct evaluation of the Fourier series at the point's
//! longitude. Legendre values are either tabulated for all points at
//! construction or recomputed on every call.

use crate::legendre::{fill_legendre, PointLegendreTable};
use crate::linalg::GemmBackend;
use crate::spectra::{legendre_size, spectral_index, zonal_offset};
use nalgebra::{DMatrix, DMatrixView};
use rayon::prelude::*;
use sphere_grid::UnstructuredGrid;
use tracing::debug;

/// Precomputed state for an unstructured grid.
#[derive(Debug)]
pub struct UnstructuredTrans {
    /// Latitudes in radians
    lats: Vec<f64>,
    /// Longitudes in radians
    lons: Vec<f64>,
    legendre: Option<PointLegendreTable>,
    gemm: GemmBackend,
}

impl UnstructuredTrans {
    /// Prepare the transform. With `precompute` the Legendre values of every
    /// point are tabulated up to `truncation + 1`.
    pub fn new(grid: &UnstructuredGrid, truncation: usize, precompute: bool, gemm: GemmBackend) -> Self {
        let lats: Vec<f64> = grid.points().iter().map(|p| p.lat.to_radians()).collect();
        let lons: Vec<f64> = grid.points().iter().map(|p| p.lon.to_radians()).collect();

        let legendre = precompute.then(|| PointLegendreTable::new(truncation + 1, &lats));

        debug!(
            grid = grid.name(),
            npts = lats.len(),
            truncation,
            precompute,
            "Unstructured transform ready"
        );

        Self {
            lats,
            lons,
            legendre,
            gemm,
        }
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn is_precomputed(&self) -> bool {
        self.legendre.is_some()
    }

    /// Spectra at `call_truncation` to point values, field-major.
    /// Buffers are assumed validated.
    pub fn invtrans(&self, call_truncation: usize, nb_fields: usize, spectra: &[f64], gp: &mut [f64]) {
        let npts = self.lats.len();
        let mut values = vec![0.0; npts * nb_fields];

        match &self.legendre {
            Some(table) if table.truncation() >= call_truncation => {
                self.precomputed(table, call_truncation, nb_fields, spectra, &mut values)
            }
            _ => self.on_the_fly(call_truncation, nb_fields, spectra, &mut values),
        }

        // point-major to field-major
        for (p, point) in values.chunks(nb_fields).enumerate() {
            for (field, &value) in point.iter().enumerate() {
                gp[field * npts + p] = value;
            }
        }
    }

    /// One gemm per zonal wavenumber against the tabulated values, then the
    /// Fourier evaluation per point. `values` is point-major.
    fn precomputed(
        &self,
        table: &PointLegendreTable,
        call_truncation: usize,
        nb_fields: usize,
        spectra: &[f64],
        values: &mut [f64],
    ) {
        let npts = self.lats.len();
        let rows = 2 * nb_fields;

        for m in 0..=call_truncation {
            let ns = call_truncation - m + 1;
            let start = rows * zonal_offset(call_truncation, m);
            let a = DMatrixView::from_slice(&spectra[start..start + rows * ns], rows, ns);

            let block = DMatrixView::from_slice(table.block(m), table.truncation() - m + 1, npts);
            let b = block.rows(0, ns);

            let mut c = DMatrix::zeros(rows, npts);
            self.gemm.gemm(&a, &b, &mut c);

            let c = c.as_slice();
            values
                .par_chunks_mut(nb_fields)
                .zip(&self.lons)
                .enumerate()
                .for_each(|(p, (point, &lon))| {
                    let column = &c[p * rows..(p + 1) * rows];
                    accumulate(m, lon, nb_fields, column, point);
                });
        }
    }

    fn on_the_fly(&self, call_truncation: usize, nb_fields: usize, spectra: &[f64], values: &mut [f64]) {
        let rows = 2 * nb_fields;
        values
            .par_chunks_mut(nb_fields)
            .zip(self.lats.par_iter().zip(&self.lons))
            .for_each_init(
                || (vec![0.0; legendre_size(call_truncation)], vec![0.0; rows]),
                |(legendre, column), (point, (&lat, &lon))| {
                    fill_legendre(call_truncation, lat, legendre);
                    for m in 0..=call_truncation {
                        column.fill(0.0);
                        let offset = zonal_offset(call_truncation, m);
                        for n in m..=call_truncation {
                            let p = legendre[offset + n - m];
                            for part in 0..2 {
                                for field in 0..nb_fields {
                                    column[field + nb_fields * part] +=
                                        p * spectra[spectral_index(call_truncation, nb_fields, m, n, part, field)];
                                }
                            }
                        }
                        accumulate(m, lon, nb_fields, column, point);
                    }
                },
            );
    }
}

/// Add the wavenumber `m` Fourier term at longitude `lon` (radians).
///
/// `column` holds the real parts for all fields followed by the imaginary
/// parts.
fn accumulate(m: usize, lon: f64, nb_fields: usize, column: &[f64], point: &mut [f64]) {
    if m == 0 {
        for (value, &re) in point.iter_mut().zip(&column[..nb_fields]) {
            *value += re;
        }
        return;
    }
    let (sin, cos) = (m as f64 * lon).sin_cos();
    for (field, value) in point.iter_mut().enumerate() {
        *value += 2.0 * (column[field] * cos - column[field + nb_fields] * sin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectra::spectral_len;
    use sphere_grid::PointLonLat;

    fn grid() -> UnstructuredGrid {
        let points = vec![
            PointLonLat::new(0.0, 90.0),
            PointLonLat::new(10.0, 45.0),
            PointLonLat::new(123.0, -12.5),
            PointLonLat::new(-70.0, -80.0),
            PointLonLat::new(359.0, 0.0),
        ];
        UnstructuredGrid::new("points", points).unwrap()
    }

    fn spectra(t: usize, nb: usize) -> Vec<f64> {
        (0..spectral_len(t, nb)).map(|k| ((k * 13) % 17) as f64 / 17.0 - 0.5).collect()
    }

    #[test]
    fn test_precomputed_matches_on_the_fly() {
        let grid = grid();
        let t = 6;
        let nb = 3;
        let input = spectra(t, nb);

        let mut expected = vec![0.0; nb * grid.size()];
        UnstructuredTrans::new(&grid, t, false, GemmBackend::Nalgebra).invtrans(t, nb, &input, &mut expected);

        for gemm in [GemmBackend::Nalgebra, GemmBackend::Generic] {
            let trans = UnstructuredTrans::new(&grid, t, true, gemm);
            assert!(trans.is_precomputed());
            let mut gp = vec![0.0; nb * grid.size()];
            trans.invtrans(t, nb, &input, &mut gp);
            for (a, b) in gp.iter().zip(&expected) {
                assert!((a - b).abs() < 1e-12, "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_extended_truncation_uses_table() {
        let grid = grid();
        let t = 4;
        let input = spectra(t + 1, 1);
        let mut on_the_fly = vec![0.0; grid.size()];
        let mut tabulated = vec![0.0; grid.size()];
        UnstructuredTrans::new(&grid, t, false, GemmBackend::Generic).invtrans(t + 1, 1, &input, &mut on_the_fly);
        UnstructuredTrans::new(&grid, t, true, GemmBackend::Generic).invtrans(t + 1, 1, &input, &mut tabulated);
        for (a, b) in tabulated.iter().zip(&on_the_fly) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_harmonic() {
        // Re(c·P̄₁¹·e^{iλ}) with factor 2
        let grid = grid();
        let t = 1;
        let mut input = vec![0.0; spectral_len(t, 1)];
        input[spectral_index(t, 1, 1, 1, 0, 0)] = 0.25;
        input[spectral_index(t, 1, 1, 1, 1, 0)] = -0.5;

        let mut gp = vec![0.0; grid.size()];
        UnstructuredTrans::new(&grid, t, true, GemmBackend::Nalgebra).invtrans(t, 1, &input, &mut gp);

        for (value, point) in gp.iter().zip(grid.points()) {
            let (lat, lon) = (point.lat.to_radians(), point.lon.to_radians());
            let p11 = 1.5f64.sqrt() * lat.cos();
            let expected = 2.0 * p11 * (0.25 * lon.cos() + 0.5 * lon.sin());
            assert!((value - expected).abs() < 1e-12);
        }
    }
}
