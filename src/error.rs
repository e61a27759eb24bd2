use thiserror::Error;

/// Custom Error and Result types to unify errors from all sources.
pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    /// Required configuration is absent or invalid.
    #[error("Configuration Error: {0}")]
    Configuration(String),
    /// The roster could not be loaded, or loaded empty.
    #[error("Roster Unavailable: {0}")]
    RosterUnavailable(String),
    #[error("HTTP Error: {0}")]
    Http(String),
    #[error("Parse Error: {0}")]
    Parse(String),
    /// The key-value store backing the cache failed.
    #[error("Storage Error: {0}")]
    Storage(String),
    #[error("Concurrency limit must be at least 1")]
    InvalidConcurrency,
}

impl From<reqwest::Error> for BoardError {
    fn from(error: reqwest::Error) -> Self {
        BoardError::Http(error.to_string())
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(error: serde_json::Error) -> Self {
        BoardError::Parse(error.to_string())
    }
}

impl From<figment::Error> for BoardError {
    fn from(error: figment::Error) -> Self {
        BoardError::Configuration(error.to_string())
    }
}
