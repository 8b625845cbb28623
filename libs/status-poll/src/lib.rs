//! Attempt-bounded status polling for prior-authorization reviews.
//!
//! The backend answers submission status queries with free text wrapping an
//! optional JSON payload. This crate owns the client-side polling core:
//! classifying those responses into a small status vocabulary, driving the
//! repeated request loop with an attempt budget and cooperative cancellation,
//! and projecting progress for display.

mod classify;
mod error;
mod progress;
mod runner;
mod session;
mod snapshot;

pub use classify::{classify, ReviewStatus};
pub use error::PollError;
pub use progress::{NullObserver, Progress, ProgressObserver};
pub use runner::{run_session, PollReport, SourceError, StatusSource};
pub use session::{
    CancelToken, PollOptions, MAX_ATTEMPTS, MAX_INTERVAL_SECONDS, MIN_ATTEMPTS,
    MIN_INTERVAL_SECONDS,
};
pub use snapshot::StatusSnapshot;
