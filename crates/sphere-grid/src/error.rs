//! Error types for grid construction.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while describing or deriving a grid.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Unknown grid name: {0}")]
    UnknownName(String),

    #[error("Grid has no points")]
    Empty,

    #[error("Latitude {lat} of row {row} is outside [-90, 90]")]
    LatitudeOutOfRange { row: usize, lat: f64 },

    #[error("Latitudes must be monotone decreasing (row {row}: {lat} after {previous})")]
    NotMonotone { row: usize, lat: f64, previous: f64 },

    #[error("Row {row} has {nx} points but its global circle only has {global_nx}")]
    RowTooWide { row: usize, nx: usize, global_nx: usize },

    #[error("Invalid grid dimension: {0}")]
    InvalidDimension(String),

    #[error("Crop window {0} selects no points")]
    EmptyCrop(String),
}
