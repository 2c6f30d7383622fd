//! Inverse Spherical-Harmonic Transforms
//!
//! This crate turns spherical-harmonic coefficients into values on grids on
//! the sphere. It supports:
//!
//! - **Structured grids**: regular and reduced Gaussian, lon/lat and cropped
//!   regional windows, using hemispheric symmetry of the Legendre functions
//! - **Unstructured grids**: arbitrary point sets, with Legendre values either
//!   tabulated up front or computed on the fly
//! - **Winds**: `u`, `v` from spectral vorticity and divergence
//!
//! # Architecture
//!
//! ```text
//! Trans::new(grid, truncation, config)
//!      │
//!      ├─► Structured grid
//!      │         ├─► LegendreTable (sym/asym, one hemisphere)
//!      │         └─► FourierBackend (FFT plans or dense cos/sin bases)
//!      │
//!      └─► Unstructured grid
//!                └─► PointLegendreTable (optional)
//!
//! Trans::invtrans*(spectra)
//!      │
//!      ├─► [winds] extend truncation, VorDivToUv → U, V spectra
//!      │
//!      ├─► Structured: legendre_stage ──► Fourier coefficients
//!      │                                        │
//!      │                                        ▼
//!      │                               FourierBackend::synthesize
//!      │
//!      ├─► Unstructured: per-m gemm + direct Fourier sum per point
//!      │
//!      └─► [winds] divide by cos(latitude)
//! ```
//!
//! # Example
//!
//! ```
//! use spectral_trans::{spectra, Trans, TransConfig};
//! use sphere_grid::Grid;
//!
//! let trans = Trans::new(Grid::from_name("F16").unwrap(), 20, TransConfig::default()).unwrap();
//!
//! // A constant field of 1.5
//! let mut coefficients = vec![0.0; trans.spectral_len(1)];
//! coefficients[spectra::spectral_index(20, 1, 0, 0, 0, 0)] = 1.5;
//!
//! let mut gp = vec![0.0; trans.grid_len(1)];
//! trans.invtrans(1, &coefficients, &mut gp).unwrap();
//! assert!(gp.iter().all(|v| (v - 1.5).abs() < 1e-12));
//! ```

pub mod config;
pub mod error;
pub mod fourier;
pub mod legendre;
pub mod linalg;
pub mod spectra;
pub mod structured;
pub mod trans;
pub mod unstructured;
pub mod vordiv;
pub mod wind;

// Re-export commonly used types at crate root
pub use config::{FourierMethod, TransConfig, EARTH_RADIUS};
pub use error::{Result, TransError};
pub use linalg::GemmBackend;
pub use spectra::{legendre_size, spectral_index, spectral_len};
pub use trans::Trans;
pub use vordiv::{SpectralVorDivToUv, VorDivToUv};
