//! Gaussian latitudes.
//!
//! The Gaussian latitudes of a grid with `N` latitudes per hemisphere are
//! the arcsines of the `2N` roots of the ordinary Legendre polynomial
//! `P_2N(μ)`. They are found by Newton iteration on the three-term
//! recurrence, starting from the usual asymptotic guess.

use std::f64::consts::PI;

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-15;

/// Evaluate `P_n(x)` and `P'_n(x)` with the three-term recurrence.
fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p_prev = 1.0;
    let mut p_curr = x;
    for k in 1..n {
        let p_next = ((2 * k + 1) as f64 * x * p_curr - k as f64 * p_prev) / (k + 1) as f64;
        p_prev = p_curr;
        p_curr = p_next;
    }
    let derivative = n as f64 * (x * p_curr - p_prev) / (x * x - 1.0);
    (p_curr, derivative)
}

/// Gaussian latitudes in degrees, ordered north to south.
///
/// `n` is the number of latitudes between pole and equator, so the result
/// holds `2n` values that are symmetric about the equator.
pub fn gaussian_latitudes(n: usize) -> Vec<f64> {
    let nlat = 2 * n;
    let mut lats = vec![0.0; nlat];
    for i in 0..n {
        let mut x = (PI * (i as f64 + 0.75) / (nlat as f64 + 0.5)).cos();
        for _ in 0..MAX_ITERATIONS {
            let (p, dp) = legendre_and_derivative(nlat, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < TOLERANCE {
                break;
            }
        }
        let lat = x.asin().to_degrees();
        lats[i] = lat;
        lats[nlat - 1 - i] = -lat;
    }
    lats
}
