//! Error types for sea

use thiserror::Error;

/// Result type for sea operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sea
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Plugin error
    #[error("{0}")]
    Plugin(String),

    /// Execution context error
    #[error("Context error: {0}")]
    Context(String),

    /// Job names must be non-empty
    #[error("Invalid job name: {0:?}")]
    InvalidJobName(String),
}
