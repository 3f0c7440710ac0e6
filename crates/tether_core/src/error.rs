//! Error types for tether

use thiserror::Error;

/// Errors raised while building components or loading configuration
///
/// Geometry and overlay lifecycle operations never fail; only construction-time
/// validation and configuration I/O do.
#[derive(Error, Debug)]
pub enum TetherError {
    /// Two options in one list share a value
    #[error("duplicate option value: {0:?}")]
    DuplicateOptionValue(String),

    /// Configuration could not be parsed
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for TetherError {
    fn from(err: toml::de::Error) -> Self {
        TetherError::Config(err.to_string())
    }
}

/// Result type for tether operations
pub type Result<T> = std::result::Result<T, TetherError>;
