//! Associated Legendre functions.
//!
//! Functions are normalised so that `1/2 ∫ P̄ₙᵐ(μ)² dμ = 1` over `[-1, 1]`,
//! with `P̄₀⁰ = 1` and no Condon-Shortley phase. They are computed with the
//! diagonal recurrence in `m` followed by the three-term recurrence in `n`:
//!
//! ```text
//! P̄ₘᵐ     = √((2m+1)/(2m)) · cosφ · P̄ₘ₋₁ᵐ⁻¹
//! P̄ₘ₊₁ᵐ   = √(2m+3) · μ · P̄ₘᵐ
//! P̄ₙᵐ     = (μ · P̄ₙ₋₁ᵐ − ε(m,n−1) · P̄ₙ₋₂ᵐ) / ε(m,n)
//! ε(m,n)  = √((n² − m²) / (4n² − 1))
//! ```

use crate::spectra::{add_padding, legendre_size, num_n, zonal_offset};
use rayon::prelude::*;
use tracing::debug;

/// Recurrence coefficient `ε(m, n)`.
pub fn epsilon(m: usize, n: usize) -> f64 {
    if n == 0 || n < m {
        return 0.0;
    }
    let (m, n) = (m as f64, n as f64);
    ((n * n - m * m) / (4.0 * n * n - 1.0)).sqrt()
}

/// Evaluate every `P̄ₙᵐ(sin lat)` up to `truncation`.
///
/// `lat` is in radians. The result is ordered like a spectral buffer
/// (m ascending, then n ascending), with `P̄ₙᵐ` at
/// `zonal_offset(truncation, m) + n - m`.
pub fn legendre_at(truncation: usize, lat: f64) -> Vec<f64> {
    let mut out = vec![0.0; legendre_size(truncation)];
    fill_legendre(truncation, lat, &mut out);
    out
}

/// Same as [`legendre_at`], writing into a caller buffer of
/// `legendre_size(truncation)` values.
pub fn fill_legendre(truncation: usize, lat: f64, out: &mut [f64]) {
    debug_assert_eq!(out.len(), legendre_size(truncation));

    let mu = lat.sin();
    let mut coslat = lat.cos().abs();
    if coslat <= f64::EPSILON.sqrt() {
        coslat = 0.0;
    }

    let mut diagonal = 1.0;
    for m in 0..=truncation {
        if m > 0 {
            let mf = m as f64;
            diagonal *= coslat * ((2.0 * mf + 1.0) / (2.0 * mf)).sqrt();
            if diagonal.abs() < f64::MIN_POSITIVE {
                diagonal = 0.0;
            }
        }

        let base = zonal_offset(truncation, m);
        out[base] = diagonal;
        if m == truncation {
            continue;
        }

        out[base + 1] = (2.0 * m as f64 + 3.0).sqrt() * mu * diagonal;
        for n in m + 2..=truncation {
            let k = base + n - m;
            out[k] = (mu * out[k - 1] - epsilon(m, n - 1) * out[k - 2]) / epsilon(m, n);
        }
    }
}

/// Legendre values on the latitudes of one hemisphere, split by parity.
///
/// Block `m` of the symmetric (`n - m` even) and antisymmetric (`n - m` odd)
/// tables is a column-major `num_n × nlats` matrix whose rows run over `n`
/// descending from the table truncation down to `m`, and whose columns run
/// over latitudes. Blocks start on multiples of 8 values.
#[derive(Debug, Clone)]
pub struct LegendreTable {
    truncation: usize,
    nlats: usize,
    sym: Vec<f64>,
    asym: Vec<f64>,
    sym_begin: Vec<usize>,
    asym_begin: Vec<usize>,
}

impl LegendreTable {
    /// Tabulate up to `truncation` on `lats` (radians).
    pub fn new(truncation: usize, lats: &[f64]) -> Self {
        let _span = tracing::debug_span!("precompute legendre", truncation, nlats = lats.len()).entered();

        let nlats = lats.len();
        let mut sym_begin = Vec::with_capacity(truncation + 2);
        let mut asym_begin = Vec::with_capacity(truncation + 2);
        let (mut sym_size, mut asym_size) = (0, 0);
        for m in 0..=truncation {
            sym_begin.push(sym_size);
            asym_begin.push(asym_size);
            sym_size += add_padding(num_n(truncation, m, true) * nlats);
            asym_size += add_padding(num_n(truncation, m, false) * nlats);
        }
        sym_begin.push(sym_size);
        asym_begin.push(asym_size);

        let mut sym = vec![0.0; sym_size];
        let mut asym = vec![0.0; asym_size];
        let mut values = vec![0.0; legendre_size(truncation)];

        for (jlat, &lat) in lats.iter().enumerate() {
            fill_legendre(truncation, lat, &mut values);
            for m in 0..=truncation {
                let sym_rows = num_n(truncation, m, true);
                let asym_rows = num_n(truncation, m, false);
                let (mut is, mut ia) = (0, 0);
                for n in (m..=truncation).rev() {
                    let value = values[zonal_offset(truncation, m) + n - m];
                    if (n - m) % 2 == 0 {
                        sym[sym_begin[m] + is + sym_rows * jlat] = value;
                        is += 1;
                    } else {
                        asym[asym_begin[m] + ia + asym_rows * jlat] = value;
                        ia += 1;
                    }
                }
            }
        }

        debug!(
            sym_bytes = sym_size * std::mem::size_of::<f64>(),
            asym_bytes = asym_size * std::mem::size_of::<f64>(),
            "Legendre tables ready"
        );

        Self {
            truncation,
            nlats,
            sym,
            asym,
            sym_begin,
            asym_begin,
        }
    }

    pub fn truncation(&self) -> usize {
        self.truncation
    }

    /// Number of tabulated latitudes.
    pub fn nlats(&self) -> usize {
        self.nlats
    }

    /// Symmetric block for `m`: `num_n(T, m, true) * nlats` values.
    pub fn sym_block(&self, m: usize) -> &[f64] {
        let start = self.sym_begin[m];
        &self.sym[start..start + num_n(self.truncation, m, true) * self.nlats]
    }

    /// Antisymmetric block for `m`: `num_n(T, m, false) * nlats` values.
    pub fn asym_block(&self, m: usize) -> &[f64] {
        let start = self.asym_begin[m];
        &self.asym[start..start + num_n(self.truncation, m, false) * self.nlats]
    }
}

/// Legendre values at every point of an unstructured grid.
///
/// Block `m` is a column-major `(T - m + 1) × npts` matrix with rows over
/// `n` ascending from `m`.
#[derive(Debug, Clone)]
pub struct PointLegendreTable {
    truncation: usize,
    npts: usize,
    values: Vec<f64>,
    begin: Vec<usize>,
}

impl PointLegendreTable {
    /// Tabulate up to `truncation` at latitudes `lats` (radians).
    pub fn new(truncation: usize, lats: &[f64]) -> Self {
        let _span = tracing::debug_span!("precompute legendre", truncation, npts = lats.len()).entered();

        let npts = lats.len();
        let begin: Vec<usize> = (0..=truncation + 1)
            .map(|m| zonal_offset(truncation, m) * npts)
            .collect();

        let per_point: Vec<Vec<f64>> = lats
            .par_iter()
            .map(|&lat| legendre_at(truncation, lat))
            .collect();

        let mut values = vec![0.0; legendre_size(truncation) * npts];
        for (p, point) in per_point.iter().enumerate() {
            for m in 0..=truncation {
                let rows = truncation - m + 1;
                let offset = zonal_offset(truncation, m);
                let column = begin[m] + rows * p;
                values[column..column + rows].copy_from_slice(&point[offset..offset + rows]);
            }
        }

        Self {
            truncation,
            npts,
            values,
            begin,
        }
    }

    pub fn truncation(&self) -> usize {
        self.truncation
    }

    pub fn npts(&self) -> usize {
        self.npts
    }

    /// Block for `m`: `(T - m + 1) * npts` values.
    pub fn block(&self, m: usize) -> &[f64] {
        &self.values[self.begin[m]..self.begin[m + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(t: usize, m: usize, n: usize) -> usize {
        zonal_offset(t, m) + n - m
    }

    #[test]
    fn test_closed_forms() {
        let lat = 0.3_f64;
        let (mu, c) = (lat.sin(), lat.cos());
        let p = legendre_at(2, lat);

        assert!((p[idx(2, 0, 0)] - 1.0).abs() < 1e-14);
        assert!((p[idx(2, 0, 1)] - 3f64.sqrt() * mu).abs() < 1e-14);
        assert!((p[idx(2, 0, 2)] - 5f64.sqrt() * 0.5 * (3.0 * mu * mu - 1.0)).abs() < 1e-14);
        assert!((p[idx(2, 1, 1)] - 1.5f64.sqrt() * c).abs() < 1e-14);
        assert!((p[idx(2, 1, 2)] - 7.5f64.sqrt() * mu * c).abs() < 1e-14);
        assert!((p[idx(2, 2, 2)] - (15.0f64 / 8.0).sqrt() * c * c).abs() < 1e-14);
    }

    #[test]
    fn test_normalisation_with_gauss_quadrature() {
        // 16 Gaussian latitudes integrate polynomials up to degree 31 exactly
        let n = 8;
        let lats = sphere_grid::gaussian_latitudes(n);
        let mus: Vec<f64> = lats.iter().map(|l| l.to_radians().sin()).collect();
        let weights: Vec<f64> = mus
            .iter()
            .map(|&mu| {
                let dp = legendre_derivative(2 * n, mu);
                2.0 / ((1.0 - mu * mu) * dp * dp)
            })
            .collect();

        let t = 7;
        let tables: Vec<Vec<f64>> = lats.iter().map(|l| legendre_at(t, l.to_radians())).collect();
        for m in 0..=t {
            for n1 in m..=t {
                for n2 in m..=t {
                    let integral: f64 = tables
                        .iter()
                        .zip(&weights)
                        .map(|(p, w)| w * p[idx(t, m, n1)] * p[idx(t, m, n2)])
                        .sum::<f64>()
                        * 0.5;
                    let expected = if n1 == n2 { 1.0 } else { 0.0 };
                    assert!(
                        (integral - expected).abs() < 1e-12,
                        "m={} n1={} n2={} integral={}",
                        m,
                        n1,
                        n2,
                        integral
                    );
                }
            }
        }
    }

    /// Derivative of the ordinary Legendre polynomial, for quadrature weights.
    fn legendre_derivative(n: usize, x: f64) -> f64 {
        let (mut p0, mut p1) = (1.0, x);
        for k in 2..=n {
            let kf = k as f64;
            let p2 = ((2.0 * kf - 1.0) * x * p1 - (kf - 1.0) * p0) / kf;
            p0 = p1;
            p1 = p2;
        }
        n as f64 * (x * p1 - p0) / (x * x - 1.0)
    }

    #[test]
    fn test_parity() {
        let t = 9;
        let north = legendre_at(t, 0.7);
        let south = legendre_at(t, -0.7);
        for m in 0..=t {
            for n in m..=t {
                let sign = if (n - m) % 2 == 0 { 1.0 } else { -1.0 };
                let k = idx(t, m, n);
                assert!((north[k] - sign * south[k]).abs() < 1e-13);
            }
        }
    }

    #[test]
    fn test_pole_values() {
        let t = 6;
        let p = legendre_at(t, std::f64::consts::FRAC_PI_2);
        for m in 1..=t {
            for n in m..=t {
                assert_eq!(p[idx(t, m, n)], 0.0);
            }
        }
        for n in 0..=t {
            assert!((p[idx(t, 0, n)] - (2.0 * n as f64 + 1.0).sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_split_table_layout() {
        let t = 5;
        let lats = [1.2, 0.6, 0.1];
        let table = LegendreTable::new(t, &lats);
        assert_eq!(table.nlats(), 3);

        for m in 0..=t {
            let sym = table.sym_block(m);
            let asym = table.asym_block(m);
            let sym_rows = num_n(t, m, true);
            let asym_rows = num_n(t, m, false);
            assert_eq!(sym.len(), sym_rows * 3);
            assert_eq!(asym.len(), asym_rows * 3);
            assert_eq!(table.sym_begin[m] % 8, 0);

            for (jlat, &lat) in lats.iter().enumerate() {
                let p = legendre_at(t, lat);
                for (k, n) in (m..=t).rev().filter(|n| (n - m) % 2 == 0).enumerate() {
                    assert_eq!(sym[k + sym_rows * jlat], p[idx(t, m, n)]);
                }
                for (k, n) in (m..=t).rev().filter(|n| (n - m) % 2 == 1).enumerate() {
                    assert_eq!(asym[k + asym_rows * jlat], p[idx(t, m, n)]);
                }
            }
        }
    }

    #[test]
    fn test_point_table_layout() {
        let t = 4;
        let lats = [0.5, -0.2];
        let table = PointLegendreTable::new(t, &lats);
        assert_eq!(table.npts(), 2);

        for m in 0..=t {
            let block = table.block(m);
            let rows = t - m + 1;
            assert_eq!(block.len(), rows * 2);
            for (p, &lat) in lats.iter().enumerate() {
                let values = legendre_at(t, lat);
                for n in m..=t {
                    assert_eq!(block[n - m + rows * p], values[idx(t, m, n)]);
                }
            }
        }
    }
}
