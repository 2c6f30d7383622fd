//! Shared test utilities for the spectral-trans workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Spectral coefficient generators
//! - Grid fixtures
//! - Approximate comparison macros
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{random_spectra, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Assert that two scalars differ by at most `tol`.
///
/// An optional format string and arguments name the failing value.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(gp[k], expected, 1e-10);
/// assert_approx_eq!(gp[k], expected, 1e-10, "row {} point {}", j, i);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tol:expr $(,)?) => {
        $crate::assert_approx_eq!($actual, $expected, $tol, "values differ")
    };
    ($actual:expr, $expected:expr, $tol:expr, $($context:tt)+) => {{
        let actual: f64 = $actual;
        let expected: f64 = $expected;
        let tol: f64 = $tol;
        let diff = (actual - expected).abs();
        if !(diff <= tol) {
            panic!(
                "{}: actual {:?}, expected {:?}, |diff| {:?} > {:?}",
                format_args!($($context)+),
                actual,
                expected,
                diff,
                tol
            );
        }
    }};
}

/// Macro for approximate equality of two slices, relative to the largest
/// magnitude in `right`.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_fields_close;
///
/// assert_fields_close!(&fft_output, &dense_output, 1e-10);
/// ```
#[macro_export]
macro_rules! assert_fields_close {
    ($left:expr, $right:expr, $rtol:expr) => {{
        let left: &[f64] = $left;
        let right: &[f64] = $right;
        let rtol: f64 = $rtol as f64;
        assert_eq!(left.len(), right.len(), "slices differ in length");
        let scale = $crate::max_abs(right).max(f64::MIN_POSITIVE);
        for (i, (l, r)) in left.iter().zip(right).enumerate() {
            let diff = (l - r).abs();
            if !(diff <= rtol * scale) {
                panic!(
                    "assertion failed: value {} differs\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > {:?} * {:?}",
                    i, l, r, diff, rtol, scale
                );
            }
        }
    }};
}

/// Largest absolute value in a slice (0 for an empty slice).
pub fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc.max(v.abs()))
}
