//! Error types for the varscope-search crate.
//!
//! Every variant carries a plain string message so that the error is
//! `Clone`: a single failed computation can be handed to every caller
//! attached to it through the single-flight cache.

/// Errors that can occur while querying the variant search backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The HTTP request to the backend could not be completed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend did not answer within the configured timeout.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// The backend answered with a non-success status.
    #[error("backend error: {0}")]
    Backend(String),

    /// The backend response could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration or request arguments.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Whether this error originated from the transport or the backend
    /// rather than from local validation.
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout(_) | Self::Backend(_) | Self::Parse(_))
    }
}

/// Convenience type alias for varscope-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
