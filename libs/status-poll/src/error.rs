//! Error types for the polling crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("poll interval must be between 1 and 10 seconds, got {0}")]
    IntervalOutOfRange(u64),

    #[error("maximum attempts must be between 1 and 30, got {0}")]
    AttemptsOutOfRange(u32),

    #[error("resource id must not be empty")]
    EmptyResourceId,
}
