//! Error types for the varscope host.

use varscope_search::SearchError;

/// Top-level error type for configuration loading and CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum VarscopeError {
    /// Configuration file could not be parsed or serialized.
    #[error("config error: {0}")]
    Config(String),

    /// Search layer error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Output could not be rendered as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, VarscopeError>;
