// Error types for the gitfolio library.
// Covers GitHub API errors, cache store errors, and general failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitfolioError {
    /// Non-2xx response from the GitHub API.
    #[error("GitHub API error: {status}")]
    Http { status: u16 },

    #[error("request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no cache directory available on this platform")]
    NoCacheDir,

    #[error("{0}")]
    Other(String),
}

impl GitfolioError {
    /// The HTTP status carried by an upstream failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitfolioError::Http { status } => Some(*status),
            GitfolioError::Api(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GitfolioError>;
