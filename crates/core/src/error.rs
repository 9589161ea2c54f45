//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid media path: {0}")]
    InvalidPath(String),

    #[error("invalid transform command: {0}")]
    InvalidCommand(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
