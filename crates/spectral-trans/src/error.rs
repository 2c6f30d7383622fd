//! Error types for spectral transforms.

use sphere_grid::GridError;
use thiserror::Error;

/// Errors that can occur while building or running a transform.
#[derive(Error, Debug)]
pub enum TransError {
    /// Invalid truncation, grid or configuration value. Raised at
    /// construction; retrying with the same inputs fails again.
    #[error("configuration error: {0}")]
    Config(String),

    /// A caller-provided buffer has the wrong length.
    #[error("{what} buffer has {actual} values, expected {expected}")]
    InvalidBuffer {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The operation is not provided by this transform.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// Error from the grid description.
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
}

impl TransError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check a buffer length, returning an InvalidBuffer error on mismatch.
    pub fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::InvalidBuffer {
                what,
                expected,
                actual,
            })
        }
    }
}

impl From<serde_json::Error> for TransError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransError>;
