//! Spectral coefficient generators.
//!
//! Buffers follow the packed spectral layout used by the transforms: zonal
//! wavenumber `m` ascending, total wavenumber `n` ascending from `m`, then
//! real/imaginary part, then field.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of values in a spectral buffer.
pub fn spectral_buffer_len(truncation: usize, nb_fields: usize) -> usize {
    (truncation + 2) * (truncation + 1) * nb_fields
}

/// Flat index of coefficient (m, n), part `part` of field `field`.
pub fn coefficient_index(
    truncation: usize,
    nb_fields: usize,
    m: usize,
    n: usize,
    part: usize,
    field: usize,
) -> usize {
    let offset = (2 * truncation + 3 - m) * m / 2;
    field + nb_fields * (part + 2 * (offset + n - m))
}

/// Call `f(m, n, part, field, index)` for every slot of a spectral buffer.
pub fn for_each_coefficient(
    truncation: usize,
    nb_fields: usize,
    mut f: impl FnMut(usize, usize, usize, usize, usize),
) {
    for m in 0..=truncation {
        for n in m..=truncation {
            for part in 0..2 {
                for field in 0..nb_fields {
                    f(m, n, part, field, coefficient_index(truncation, nb_fields, m, n, part, field));
                }
            }
        }
    }
}

/// Random coefficients in `[-1, 1)`, reproducible from `seed`.
///
/// The unused imaginary part of `m = 0` is set to a large value so that
/// tests notice if a transform reads it.
///
/// # Example
///
/// ```
/// use test_utils::random_spectra;
///
/// let a = random_spectra(10, 2, 42);
/// let b = random_spectra(10, 2, 42);
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 2 * 66 * 2);
/// ```
pub fn random_spectra(truncation: usize, nb_fields: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut spectra = vec![0.0; spectral_buffer_len(truncation, nb_fields)];
    for_each_coefficient(truncation, nb_fields, |m, _n, part, _field, k| {
        spectra[k] = if m == 0 && part == 1 {
            1.0e6
        } else {
            rng.gen_range(-1.0..1.0)
        };
    });
    spectra
}

/// Random coefficients restricted to `n - m` of one parity; all others zero.
///
/// With `odd = false` the field is symmetric about the equator, with
/// `odd = true` antisymmetric.
pub fn parity_spectra(truncation: usize, nb_fields: usize, odd: bool, seed: u64) -> Vec<f64> {
    let mut spectra = random_spectra(truncation, nb_fields, seed);
    for_each_coefficient(truncation, nb_fields, |m, n, _part, _field, k| {
        if ((n - m) % 2 == 1) != odd {
            spectra[k] = 0.0;
        }
    });
    spectra
}

/// Spectra of a constant field.
pub fn constant_spectra(truncation: usize, nb_fields: usize, value: f64) -> Vec<f64> {
    let mut spectra = vec![0.0; spectral_buffer_len(truncation, nb_fields)];
    for field in 0..nb_fields {
        spectra[coefficient_index(truncation, nb_fields, 0, 0, 0, field)] = value;
    }
    spectra
}

/// Vorticity spectra of solid-body rotation `u = u0·cosφ` on a sphere of
/// radius `radius` (and zero divergence).
pub fn solid_body_vorticity(truncation: usize, nb_fields: usize, u0: f64, radius: f64) -> Vec<f64> {
    let mut spectra = vec![0.0; spectral_buffer_len(truncation, nb_fields)];
    if truncation >= 1 {
        for field in 0..nb_fields {
            spectra[coefficient_index(truncation, nb_fields, 0, 1, 0, field)] =
                2.0 * u0 / (radius * 3f64.sqrt());
        }
    }
    spectra
}
