//! Error types for loading rows, building hierarchies and configuring views.

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, SunburstError>;

#[derive(Debug, Error)]
pub enum SunburstError {
    /// The row source is not a sequence of field → value mappings.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The grouping field list cannot produce a hierarchy.
    #[error("invalid group field: {0}")]
    InvalidGroupField(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
