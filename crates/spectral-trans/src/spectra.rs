//! Layout of packed spectral coefficient buffers.
//!
//! A spectral buffer at truncation `T` stores, for every zonal wavenumber
//! `m` in `0..=T` and total wavenumber `n` in `m..=T` (both ascending), the
//! real and then the imaginary part of the coefficient, each for all fields:
//!
//! ```text
//! index(m, n, part, field) = field + nb_fields * (part + 2 * (offset(m) + n - m))
//! offset(m)                = m * (2T + 3 - m) / 2
//! ```
//!
//! The imaginary slot of `m = 0` is stored but never read.

/// Number of (m, n) pairs with `0 <= m <= n <= truncation`.
pub fn legendre_size(truncation: usize) -> usize {
    (truncation + 2) * (truncation + 1) / 2
}

/// Number of real values in a spectral buffer for `nb_fields` fields.
pub fn spectral_len(truncation: usize, nb_fields: usize) -> usize {
    2 * legendre_size(truncation) * nb_fields
}

/// Number of (m, n) pairs stored before zonal wavenumber `m`.
pub fn zonal_offset(truncation: usize, m: usize) -> usize {
    (2 * truncation + 3 - m) * m / 2
}

/// Flat index of coefficient (m, n), component `part` (0 real, 1 imaginary)
/// of field `field`.
pub fn spectral_index(
    truncation: usize,
    nb_fields: usize,
    m: usize,
    n: usize,
    part: usize,
    field: usize,
) -> usize {
    debug_assert!(m <= n && n <= truncation && part < 2 && field < nb_fields);
    field + nb_fields * (part + 2 * (zonal_offset(truncation, m) + n - m))
}

/// Number of total wavenumbers `n` in `m..=truncation` with `n - m` even
/// (`symmetric`) or odd.
pub fn num_n(truncation: usize, m: usize, symmetric: bool) -> usize {
    if m > truncation {
        return 0;
    }
    if symmetric {
        (truncation - m + 2) / 2
    } else {
        (truncation - m + 1) / 2
    }
}

/// Round `n` up to the next multiple of 8.
pub fn add_padding(n: usize) -> usize {
    n.div_ceil(8) * 8
}

/// Number of real components stored per coefficient at zonal wavenumber `m`.
pub fn n_imag(m: usize) -> usize {
    if m == 0 {
        1
    } else {
        2
    }
}

/// Copy spectra at `truncation` into a buffer at `truncation + 1`, zeroing
/// every coefficient with `m` or `n` equal to `truncation + 1`.
pub fn extend_truncation(truncation: usize, nb_fields: usize, spectra: &[f64]) -> Vec<f64> {
    let extended = truncation + 1;
    let mut out = Vec::with_capacity(spectral_len(extended, nb_fields));
    let mut old = spectra.iter();
    for m in 0..=extended {
        for n in m..=extended {
            for _part in 0..2 {
                for _field in 0..nb_fields {
                    if m == extended || n == extended {
                        out.push(0.0);
                    } else {
                        out.push(old.next().copied().unwrap_or(0.0));
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legendre_size() {
        assert_eq!(legendre_size(0), 1);
        assert_eq!(legendre_size(1), 3);
        assert_eq!(legendre_size(10), 66);
        assert_eq!(spectral_len(10, 3), 396);
    }

    #[test]
    fn test_spectral_index_is_dense() {
        let t = 5;
        let nb = 2;
        let mut expected = 0;
        for m in 0..=t {
            assert_eq!(zonal_offset(t, m) * 2 * nb, expected);
            for n in m..=t {
                for part in 0..2 {
                    for field in 0..nb {
                        assert_eq!(spectral_index(t, nb, m, n, part, field), expected);
                        expected += 1;
                    }
                }
            }
        }
        assert_eq!(expected, spectral_len(t, nb));
    }

    #[test]
    fn test_num_n_split() {
        for t in 0..7 {
            for m in 0..=t {
                assert_eq!(num_n(t, m, true) + num_n(t, m, false), t - m + 1);
            }
        }
        assert_eq!(num_n(4, 4, true), 1);
        assert_eq!(num_n(4, 4, false), 0);
        assert_eq!(num_n(4, 5, true), 0);
    }

    #[test]
    fn test_add_padding() {
        assert_eq!(add_padding(0), 0);
        assert_eq!(add_padding(1), 8);
        assert_eq!(add_padding(8), 8);
        assert_eq!(add_padding(9), 16);
    }

    #[test]
    fn test_extend_truncation() {
        let t = 2;
        let nb = 2;
        let spectra: Vec<f64> = (0..spectral_len(t, nb)).map(|v| v as f64 + 1.0).collect();
        let extended = extend_truncation(t, nb, &spectra);
        assert_eq!(extended.len(), spectral_len(t + 1, nb));

        for m in 0..=t + 1 {
            for n in m..=t + 1 {
                for part in 0..2 {
                    for field in 0..nb {
                        let value = extended[spectral_index(t + 1, nb, m, n, part, field)];
                        if n > t {
                            assert_eq!(value, 0.0);
                        } else {
                            assert_eq!(value, spectra[spectral_index(t, nb, m, n, part, field)]);
                        }
                    }
                }
            }
        }
    }
}
