//! Dense matrix multiply backends.
//!
//! All matrices are column-major `nalgebra` matrices or views over the
//! engine's flat buffers. The backend is chosen per engine through
//! [`TransConfig`](crate::TransConfig); it only affects speed, both backends
//! compute the same products up to floating-point summation order.

use nalgebra::storage::{Storage, StorageMut};
use nalgebra::{Dyn, Matrix};
use serde::{Deserialize, Serialize};

/// Matrix multiply implementation used by the Legendre and dense Fourier
/// stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GemmBackend {
    /// `nalgebra`'s blocked gemm.
    #[default]
    Nalgebra,
    /// Plain triple loop, kept as a reference implementation.
    Generic,
}

impl GemmBackend {
    /// Parse from string (case-insensitive). Unknown values select `Nalgebra`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "generic" | "reference" => Self::Generic,
            _ => Self::Nalgebra,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nalgebra => "nalgebra",
            Self::Generic => "generic",
        }
    }

    /// `c = a * b`. Shapes must agree; `c` is overwritten.
    pub fn gemm<SA, SB, SC>(
        &self,
        a: &Matrix<f64, Dyn, Dyn, SA>,
        b: &Matrix<f64, Dyn, Dyn, SB>,
        c: &mut Matrix<f64, Dyn, Dyn, SC>,
    ) where
        SA: Storage<f64, Dyn, Dyn>,
        SB: Storage<f64, Dyn, Dyn>,
        SC: StorageMut<f64, Dyn, Dyn>,
    {
        debug_assert_eq!(a.ncols(), b.nrows());
        debug_assert_eq!(a.nrows(), c.nrows());
        debug_assert_eq!(b.ncols(), c.ncols());

        if a.ncols() == 0 {
            c.fill(0.0);
            return;
        }

        match self {
            Self::Nalgebra => c.gemm(1.0, a, b, 0.0),
            Self::Generic => {
                for j in 0..c.ncols() {
                    for i in 0..c.nrows() {
                        let mut sum = 0.0;
                        for k in 0..a.ncols() {
                            sum += a[(i, k)] * b[(k, j)];
                        }
                        c[(i, j)] = sum;
                    }
                }
            }
        }
    }
}

impl std::fmt::Display for GemmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DMatrixView};

    #[test]
    fn test_backends_agree() {
        let a = DMatrix::from_fn(3, 4, |i, j| (i * 4 + j) as f64 * 0.5 - 1.0);
        let b = DMatrix::from_fn(4, 2, |i, j| (i as f64 + 1.0) / (j as f64 + 2.0));

        let mut c1 = DMatrix::zeros(3, 2);
        let mut c2 = DMatrix::zeros(3, 2);
        GemmBackend::Nalgebra.gemm(&a, &b, &mut c1);
        GemmBackend::Generic.gemm(&a, &b, &mut c2);

        let expected = &a * &b;
        assert!((c1 - &expected).abs().max() < 1e-14);
        assert!((c2 - &expected).abs().max() < 1e-14);
    }

    #[test]
    fn test_gemm_on_views() {
        let data: Vec<f64> = (0..6).map(|v| v as f64).collect();
        // column-major 2x3: [[0, 2, 4], [1, 3, 5]]
        let a = DMatrixView::from_slice(&data, 2, 3);
        let ones = vec![1.0; 3];
        let b = DMatrixView::from_slice(&ones, 3, 1);
        let mut c = DMatrix::zeros(2, 1);
        GemmBackend::Generic.gemm(&a, &b, &mut c);
        assert_eq!(c[(0, 0)], 6.0);
        assert_eq!(c[(1, 0)], 9.0);
    }

    #[test]
    fn test_empty_inner_dimension_zeroes_output() {
        let a = DMatrix::<f64>::zeros(2, 0);
        let b = DMatrix::<f64>::zeros(0, 3);
        let mut c = DMatrix::from_element(2, 3, 7.0);
        GemmBackend::Nalgebra.gemm(&a, &b, &mut c);
        assert!(c.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(GemmBackend::from_str("GENERIC"), GemmBackend::Generic);
        assert_eq!(GemmBackend::from_str("mkl"), GemmBackend::Nalgebra);
    }
}
