//! Configuration for the transform engine.

use crate::error::{Result, TransError};
use crate::linalg::GemmBackend;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres, as used by GRIB2 edition 2 shape 6.
pub const EARTH_RADIUS: f64 = 6_371_229.0;

/// Configuration for a [`Trans`](crate::Trans) instance.
///
/// The configuration is fixed at construction: changing it means building a
/// new engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransConfig {
    /// Precompute Legendre polynomials per point for unstructured grids.
    pub precompute: bool,

    /// Fraction of the global longitude count below which the dense
    /// Fourier synthesis replaces the FFT (only with `FourierMethod::Auto`).
    pub fft_threshold: f64,

    /// Fourier synthesis used on structured grids.
    pub fourier: FourierMethod,

    /// Matrix multiply backend.
    pub gemm_backend: GemmBackend,

    /// Sphere radius in metres used when deriving winds from vorticity and
    /// divergence.
    pub radius: f64,
}

impl Default for TransConfig {
    fn default() -> Self {
        Self {
            precompute: true,
            fft_threshold: 0.05,
            fourier: FourierMethod::Auto,
            gemm_backend: GemmBackend::Nalgebra,
            radius: EARTH_RADIUS,
        }
    }
}

impl TransConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("TRANS_PRECOMPUTE") {
            config.precompute = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("TRANS_FFT_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.fft_threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("TRANS_FOURIER") {
            config.fourier = FourierMethod::from_str(&val);
        }

        if let Ok(val) = std::env::var("TRANS_GEMM_BACKEND") {
            config.gemm_backend = GemmBackend::from_str(&val);
        }

        if let Ok(val) = std::env::var("TRANS_EARTH_RADIUS") {
            if let Ok(radius) = val.parse() {
                config.radius = radius;
            }
        }

        config
    }

    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fft_threshold) {
            return Err(TransError::config(format!(
                "fft_threshold must be within [0, 1], got {}",
                self.fft_threshold
            )));
        }

        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(TransError::config(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }

        Ok(())
    }

    pub fn with_precompute(mut self, precompute: bool) -> Self {
        self.precompute = precompute;
        self
    }

    pub fn with_fourier(mut self, fourier: FourierMethod) -> Self {
        self.fourier = fourier;
        self
    }

    pub fn with_gemm_backend(mut self, backend: GemmBackend) -> Self {
        self.gemm_backend = backend;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

/// Fourier synthesis along latitude rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FourierMethod {
    /// FFT unless the grid is a narrow window of the global circle.
    #[default]
    Auto,
    /// Always FFT on the global circle.
    Fft,
    /// Dense multiply, coefficients times basis, then transposed into
    /// grid-point order.
    #[serde(rename = "dense1")]
    DenseTransposed,
    /// Dense multiply, basis times coefficients, written straight into
    /// grid-point order.
    #[serde(rename = "dense2")]
    Dense,
}

impl FourierMethod {
    /// Parse from string (case-insensitive). Unknown values select `Auto`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fft" => Self::Fft,
            "dense1" | "dense_transposed" => Self::DenseTransposed,
            "dense2" | "dense" => Self::Dense,
            _ => Self::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Fft => "fft",
            Self::DenseTransposed => "dense1",
            Self::Dense => "dense2",
        }
    }
}

impl std::fmt::Display for FourierMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
