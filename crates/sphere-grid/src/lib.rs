//! Grid descriptions on the sphere.
//!
//! Two kinds of grids are supported:
//!
//! - **Structured** grids: an ordered list of latitude rows (north to south).
//!   Every row is a window of a regular circle of longitudes, which covers
//!   regular lon/lat grids, regular and reduced Gaussian grids, and cropped
//!   regional sub-windows of any of them.
//! - **Unstructured** grids: a plain list of (lon, lat) points.
//!
//! Grids can be built from the usual short names:
//!
//! | Name       | Grid                                             |
//! |------------|--------------------------------------------------|
//! | `F32`      | regular Gaussian, 64 latitudes x 128 longitudes  |
//! | `O32`      | octahedral reduced Gaussian, 64 latitudes        |
//! | `L64x33`   | regular lon/lat including both poles             |
//! | `S64x32`   | lon/lat shifted by half a cell, poles excluded   |
//!
//! ```
//! use sphere_grid::Grid;
//!
//! let grid = Grid::from_name("O16").unwrap();
//! assert_eq!(grid.as_structured().unwrap().ny(), 32);
//! ```

pub mod error;
pub mod gaussian;
pub mod structured;
pub mod unstructured;

pub use error::{GridError, GridResult};
pub use gaussian::gaussian_latitudes;
pub use structured::{LatitudeRow, StructuredGrid};
pub use unstructured::{PointLonLat, UnstructuredGrid};

use serde::{Deserialize, Serialize};

/// A grid on the sphere, either row-structured or a free point set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Grid {
    Structured(StructuredGrid),
    Unstructured(UnstructuredGrid),
}

impl Grid {
    /// Build a global grid from its short name (`F32`, `O32`, `L64x33`, `S64x32`).
    pub fn from_name(name: &str) -> GridResult<Self> {
        let name = name.trim();
        let invalid = || GridError::UnknownName(name.to_string());

        let (prefix, rest) = name.split_at(name.char_indices().nth(1).map_or(name.len(), |(i, _)| i));
        match prefix.to_ascii_uppercase().as_str() {
            "F" | "O" => {
                let n: usize = rest.parse().map_err(|_| invalid())?;
                let grid = if prefix.eq_ignore_ascii_case("O") {
                    StructuredGrid::octahedral_gaussian(n)?
                } else {
                    StructuredGrid::regular_gaussian(n)?
                };
                Ok(Grid::Structured(grid))
            }
            "L" | "S" => {
                let (nx, ny) = rest.split_once(['x', 'X']).ok_or_else(invalid)?;
                let nx: usize = nx.parse().map_err(|_| invalid())?;
                let ny: usize = ny.parse().map_err(|_| invalid())?;
                let grid = if prefix.eq_ignore_ascii_case("L") {
                    StructuredGrid::regular_lonlat(nx, ny)?
                } else {
                    StructuredGrid::shifted_lonlat(nx, ny)?
                };
                Ok(Grid::Structured(grid))
            }
            _ => Err(invalid()),
        }
    }

    /// Grid name, as given at construction.
    pub fn name(&self) -> &str {
        match self {
            Grid::Structured(g) => g.name(),
            Grid::Unstructured(g) => g.name(),
        }
    }

    /// Total number of grid points.
    pub fn size(&self) -> usize {
        match self {
            Grid::Structured(g) => g.size(),
            Grid::Unstructured(g) => g.size(),
        }
    }

    pub fn as_structured(&self) -> Option<&StructuredGrid> {
        match self {
            Grid::Structured(g) => Some(g),
            Grid::Unstructured(_) => None,
        }
    }

    pub fn as_unstructured(&self) -> Option<&UnstructuredGrid> {
        match self {
            Grid::Structured(_) => None,
            Grid::Unstructured(g) => Some(g),
        }
    }

    /// All points of the grid as (lon, lat) in degrees, in storage order.
    pub fn points(&self) -> Vec<PointLonLat> {
        match self {
            Grid::Structured(g) => g.points().collect(),
            Grid::Unstructured(g) => g.points().to_vec(),
        }
    }
}

impl From<StructuredGrid> for Grid {
    fn from(grid: StructuredGrid) -> Self {
        Grid::Structured(grid)
    }
}

impl From<UnstructuredGrid> for Grid {
    fn from(grid: UnstructuredGrid) -> Self {
        Grid::Unstructured(grid)
    }
}
