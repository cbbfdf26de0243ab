//! Error types for wapar-core

use thiserror::Error;

/// Main error type for the wapar-core library.
///
/// Snapshot store operations deliberately do not use this type: storage
/// failures are caught internally and degrade to `false`/empty/`None`
/// return values. Import is the one boundary that rejects loudly.
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

    /// Import validation failure
    #[error("import error: {0}")]
    Import(String),
}

/// Result type alias for wapar-core
pub type Result<T> = std::result::Result<T, Error>;
