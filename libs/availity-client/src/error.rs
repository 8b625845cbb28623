//! Error types for the backend client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Network-level failure reaching the backend.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered outside the 2xx range.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A response expected to contain JSON did not parse.
    #[error("malformed JSON in response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend reported failure text without a usable resource id.
    #[error("{0}")]
    Business(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Poll(#[from] priorflow_poll::PollError),

    #[error(transparent)]
    Cache(#[from] priorflow_cache::CacheError),
}
