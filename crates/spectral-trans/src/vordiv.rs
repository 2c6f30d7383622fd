//! Vorticity and divergence to wind spectra.
//!
//! Converts spectral vorticity `ζ` and divergence `D` into the spectra of
//! `U = u·cosφ` and `V = v·cosφ` on a sphere of radius `a`:
//!
//! ```text
//! U(m,n) = a·[ −ε(m,n)/n · ζ(m,n−1) + ε(m,n+1)/(n+1) · ζ(m,n+1) − i·m/(n(n+1)) · D(m,n) ]
//! V(m,n) = a·[ −i·m/(n(n+1)) · ζ(m,n) + ε(m,n)/n · D(m,n−1) − ε(m,n+1)/(n+1) · D(m,n+1) ]
//! ```
//!
//! `U` and `V` reach one wavenumber further than `ζ` and `D`, so callers pass
//! vorticity and divergence already extended by one (see
//! [`extend_truncation`](crate::spectra::extend_truncation)).

use crate::error::{Result, TransError};
use crate::legendre::epsilon;
use crate::spectra::{spectral_index, spectral_len};

/// Spectral conversion of vorticity/divergence into `U`, `V` spectra.
///
/// All four buffers are packed at `truncation` for `nb_fields` fields.
pub trait VorDivToUv: Send + Sync {
    fn execute(
        &self,
        truncation: usize,
        nb_fields: usize,
        vorticity: &[f64],
        divergence: &[f64],
        u: &mut [f64],
        v: &mut [f64],
    ) -> Result<()>;
}

/// Exact spectral conversion using the Legendre recurrence coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralVorDivToUv {
    radius: f64,
}

impl SpectralVorDivToUv {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl VorDivToUv for SpectralVorDivToUv {
    fn execute(
        &self,
        truncation: usize,
        nb_fields: usize,
        vorticity: &[f64],
        divergence: &[f64],
        u: &mut [f64],
        v: &mut [f64],
    ) -> Result<()> {
        let len = spectral_len(truncation, nb_fields);
        TransError::check_len("vorticity", len, vorticity.len())?;
        TransError::check_len("divergence", len, divergence.len())?;
        TransError::check_len("u", len, u.len())?;
        TransError::check_len("v", len, v.len())?;

        let a = self.radius;
        let index = |m, n, part, field| spectral_index(truncation, nb_fields, m, n, part, field);

        for m in 0..=truncation {
            for n in m..=truncation {
                let nf = n as f64;
                // n = 0 terms vanish
                let (below, rotation) = if n == 0 {
                    (0.0, 0.0)
                } else {
                    (epsilon(m, n) / nf, m as f64 / (nf * (nf + 1.0)))
                };
                let above = epsilon(m, n + 1) / (nf + 1.0);

                for field in 0..nb_fields {
                    let at = |buffer: &[f64], n: usize, part: usize| buffer[index(m, n, part, field)];
                    let neighbours = |buffer: &[f64], part: usize| {
                        let lower = if n > m { at(buffer, n - 1, part) } else { 0.0 };
                        let upper = if n < truncation { at(buffer, n + 1, part) } else { 0.0 };
                        (lower, upper)
                    };

                    for part in 0..2 {
                        let (vor_lower, vor_upper) = neighbours(vorticity, part);
                        let (div_lower, div_upper) = neighbours(divergence, part);

                        // -i·k·c: the real part takes k·Im(c), the imaginary part -k·Re(c)
                        let (div_rot, vor_rot) = if part == 0 {
                            (rotation * at(divergence, n, 1), rotation * at(vorticity, n, 1))
                        } else {
                            (-rotation * at(divergence, n, 0), -rotation * at(vorticity, n, 0))
                        };

                        let k = index(m, n, part, field);
                        u[k] = a * (-below * vor_lower + above * vor_upper + div_rot);
                        v[k] = a * (vor_rot + below * div_lower - above * div_upper);
                    }
                }
            }
        }

        Ok(())
    }
}
