//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants
//! cover invalid configuration, unknown or incomplete particle geometries, non-positive draws from
//! deterministic variations, exhausted redraw budgets, and errors attributed to a sample species.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("particle map geometry '{name}' is not implemented")]
    UnknownGeometry { name: String },

    #[error("custom geometry requires a voxel map and its voxel spacing")]
    MissingCustomMap,

    #[error("only maps with equal dimensions are accepted, got {}x{}x{}", .dims[0], .dims[1], .dims[2])]
    NonCubicMap { dims: [usize; 3] },

    #[error("voxel data has {actual} values, expected {expected}")]
    GridSizeMismatch { expected: usize, actual: usize },

    #[error("{quantity} must be > 0 (got {value}), change the configuration")]
    NonPositive { quantity: String, value: f64 },

    #[error("{quantity} stayed <= 0 after {attempts} draws")]
    SamplingExhausted { quantity: String, attempts: usize },

    #[error("sample has no particle species")]
    NoSpecies,

    #[error("species '{name}': {source}")]
    Species {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attributes this error to the named sample species.
    pub fn in_species(self, name: impl Into<String>) -> Self {
        Error::Species {
            name: name.into(),
            source: Box::new(self),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
