//! Error types for homunculus-core

use thiserror::Error;

/// Main error type for the homunculus-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Logging setup error
    #[error("logging error: {0}")]
    Logging(String),

    /// Observer pid marker holds something that is not a usable pid
    #[error("invalid observer pid: {0:?}")]
    InvalidPid(String),
}

/// Result type alias for homunculus-core
pub type Result<T> = std::result::Result<T, Error>;
