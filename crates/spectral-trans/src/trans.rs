//! The transform engine.

use crate::config::TransConfig;
use crate::error::{Result, TransError};
use crate::spectra::{extend_truncation, spectral_len};
use crate::structured::StructuredTrans;
use crate::unstructured::UnstructuredTrans;
use crate::vordiv::{SpectralVorDivToUv, VorDivToUv};
use crate::wind::{divide_points_by_coslat, divide_rows_by_coslat};
use sphere_grid::Grid;
use tracing::{debug, info, instrument};

enum Backend {
    Structured(StructuredTrans),
    Unstructured(UnstructuredTrans),
}

/// Inverse spectral transform for one grid and truncation.
///
/// All tables are computed in [`Trans::new`]; the `invtrans*` methods only
/// read them and can be called concurrently from several threads.
///
/// Grid-point buffers are field-major: value `i` of row `j` of field `f` is
/// at `f * npts + row_offset(j) + i`, and points of an unstructured grid
/// follow in their own order.
///
/// # Example
///
/// ```
/// use spectral_trans::{Trans, TransConfig};
/// use sphere_grid::Grid;
///
/// let grid = Grid::from_name("O16").unwrap();
/// let trans = Trans::new(grid, 15, TransConfig::default()).unwrap();
///
/// let spectra = vec![0.0; trans.spectral_len(1)];
/// let mut gp = vec![0.0; trans.grid_len(1)];
/// trans.invtrans(1, &spectra, &mut gp).unwrap();
/// ```
pub struct Trans {
    grid: Grid,
    truncation: usize,
    config: TransConfig,
    backend: Backend,
    vordiv: Box<dyn VorDivToUv>,
}

impl Trans {
    /// Build the engine, precomputing Legendre tables and Fourier plans.
    #[instrument(skip(grid, config), fields(grid = %grid.name(), npts = grid.size()))]
    pub fn new(grid: Grid, truncation: usize, config: TransConfig) -> Result<Self> {
        config.validate()?;

        let backend = match &grid {
            Grid::Structured(structured) => {
                Backend::Structured(StructuredTrans::new(structured, truncation, &config)?)
            }
            Grid::Unstructured(unstructured) => Backend::Unstructured(UnstructuredTrans::new(
                unstructured,
                truncation,
                config.precompute,
                config.gemm_backend,
            )),
        };

        info!(
            fourier = ?config.fourier,
            gemm = %config.gemm_backend,
            precompute = config.precompute,
            "Spectral transform initialised"
        );

        Ok(Self {
            vordiv: Box::new(SpectralVorDivToUv::new(config.radius)),
            grid,
            truncation,
            config,
            backend,
        })
    }

    /// Build the engine on a named grid (`F16`, `O32`, `L64x33`, `S48x24`).
    pub fn from_name(name: &str, truncation: usize, config: TransConfig) -> Result<Self> {
        let grid = Grid::from_name(name)?;
        Self::new(grid, truncation, config)
    }

    /// Replace the vorticity/divergence to U, V conversion.
    pub fn with_vordiv_to_uv(mut self, converter: impl VorDivToUv + 'static) -> Self {
        self.vordiv = Box::new(converter);
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn truncation(&self) -> usize {
        self.truncation
    }

    pub fn config(&self) -> &TransConfig {
        &self.config
    }

    /// Name of the Fourier synthesis in use, `None` on unstructured grids.
    pub fn fourier_backend(&self) -> Option<&'static str> {
        match &self.backend {
            Backend::Structured(structured) => Some(structured.fourier().name()),
            Backend::Unstructured(_) => None,
        }
    }

    /// Length of a spectral buffer holding `nb_fields` fields.
    pub fn spectral_len(&self, nb_fields: usize) -> usize {
        spectral_len(self.truncation, nb_fields)
    }

    /// Length of a grid-point buffer holding `nb_fields` fields.
    pub fn grid_len(&self, nb_fields: usize) -> usize {
        nb_fields * self.grid.size()
    }

    /// Inverse transform of `nb_fields` scalar fields.
    pub fn invtrans(&self, nb_fields: usize, spectra: &[f64], gp: &mut [f64]) -> Result<()> {
        self.invtrans_mixed(nb_fields, spectra, 0, &[], &[], gp)
    }

    /// Inverse transform of `nb_fields` vorticity/divergence pairs into
    /// winds. `gp` receives all `u` fields followed by all `v` fields.
    pub fn invtrans_vordiv2wind(
        &self,
        nb_fields: usize,
        vorticity: &[f64],
        divergence: &[f64],
        gp: &mut [f64],
    ) -> Result<()> {
        self.invtrans_mixed(0, &[], nb_fields, vorticity, divergence, gp)
    }

    /// Combined inverse transform. `gp` receives the `u` fields, then the
    /// `v` fields, then the scalar fields.
    ///
    /// Every buffer is checked before anything is written to `gp`.
    #[instrument(
        skip(self, scalar, vorticity, divergence, gp),
        fields(grid = %self.grid.name(), truncation = self.truncation)
    )]
    pub fn invtrans_mixed(
        &self,
        nb_scalar: usize,
        scalar: &[f64],
        nb_vordiv: usize,
        vorticity: &[f64],
        divergence: &[f64],
        gp: &mut [f64],
    ) -> Result<()> {
        let npts = self.grid.size();
        TransError::check_len("scalar spectra", self.spectral_len(nb_scalar), scalar.len())?;
        TransError::check_len("vorticity", self.spectral_len(nb_vordiv), vorticity.len())?;
        TransError::check_len("divergence", self.spectral_len(nb_vordiv), divergence.len())?;
        TransError::check_len("grid-point", (2 * nb_vordiv + nb_scalar) * npts, gp.len())?;

        let (wind, scalars) = gp.split_at_mut(2 * nb_vordiv * npts);

        if nb_vordiv > 0 {
            let extended = self.truncation + 1;
            let vorticity = extend_truncation(self.truncation, nb_vordiv, vorticity);
            let divergence = extend_truncation(self.truncation, nb_vordiv, divergence);
            let mut u = vec![0.0; spectral_len(extended, nb_vordiv)];
            let mut v = vec![0.0; spectral_len(extended, nb_vordiv)];
            self.vordiv
                .execute(extended, nb_vordiv, &vorticity, &divergence, &mut u, &mut v)?;

            debug!(nb_vordiv, "Transforming winds");
            let (wind_u, wind_v) = wind.split_at_mut(nb_vordiv * npts);
            self.transform(extended, nb_vordiv, &u, wind_u);
            self.transform(extended, nb_vordiv, &v, wind_v);
            self.divide_by_coslat(2 * nb_vordiv, wind);
        }

        if nb_scalar > 0 {
            debug!(nb_scalar, "Transforming scalars");
            self.transform(self.truncation, nb_scalar, scalar, scalars);
        }

        Ok(())
    }

    /// Grid point to spectral transform. Not provided.
    pub fn dirtrans(&self, _nb_fields: usize, _gp: &[f64], _spectra: &mut [f64]) -> Result<()> {
        Err(TransError::NotImplemented("dirtrans"))
    }

    /// Winds to vorticity/divergence. Not provided.
    pub fn dirtrans_wind2vordiv(
        &self,
        _nb_fields: usize,
        _wind: &[f64],
        _vorticity: &mut [f64],
        _divergence: &mut [f64],
    ) -> Result<()> {
        Err(TransError::NotImplemented("dirtrans_wind2vordiv"))
    }

    /// Inverse transform with horizontal gradients. Not provided.
    pub fn invtrans_grad(&self, _nb_fields: usize, _spectra: &[f64], _gradient: &mut [f64]) -> Result<()> {
        Err(TransError::NotImplemented("invtrans_grad"))
    }

    fn transform(&self, call_truncation: usize, nb_fields: usize, spectra: &[f64], gp: &mut [f64]) {
        match &self.backend {
            Backend::Structured(trans) => trans.invtrans(call_truncation, nb_fields, spectra, gp),
            Backend::Unstructured(trans) => trans.invtrans(call_truncation, nb_fields, spectra, gp),
        }
    }

    fn divide_by_coslat(&self, nb_fields: usize, gp: &mut [f64]) {
        match &self.backend {
            Backend::Structured(trans) => divide_rows_by_coslat(trans.grid(), nb_fields, gp),
            Backend::Unstructured(trans) => divide_points_by_coslat(trans.lats(), nb_fields, gp),
        }
    }
}

impl std::fmt::Debug for Trans {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trans")
            .field("grid", &self.grid.name())
            .field("truncation", &self.truncation)
            .field("fourier", &self.fourier_backend())
            .field("config", &self.config)
            .finish()
    }
}
