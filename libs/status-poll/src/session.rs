//! Poll session parameters and cooperative cancellation

use crate::error::PollError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const MIN_INTERVAL_SECONDS: u64 = 1;
pub const MAX_INTERVAL_SECONDS: u64 = 10;
pub const MIN_ATTEMPTS: u32 = 1;
pub const MAX_ATTEMPTS: u32 = 30;

/// Polling parameters for one session.
///
/// [`PollOptions::validated`] enforces the caller-facing bounds (1-10 second
/// interval, 1-30 attempts). The fields stay public so tests can construct
/// unbounded options, e.g. a zero interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollOptions {
    /// Build options from caller input, rejecting out-of-bounds values.
    pub fn validated(interval_seconds: u64, max_attempts: u32) -> Result<Self, PollError> {
        if !(MIN_INTERVAL_SECONDS..=MAX_INTERVAL_SECONDS).contains(&interval_seconds) {
            return Err(PollError::IntervalOutOfRange(interval_seconds));
        }
        if !(MIN_ATTEMPTS..=MAX_ATTEMPTS).contains(&max_attempts) {
            return Err(PollError::AttemptsOutOfRange(max_attempts));
        }
        Ok(Self {
            interval: Duration::from_secs(interval_seconds),
            max_attempts,
        })
    }
}

/// Cooperative cancellation flag for a poll session.
///
/// Checked at tick boundaries only: a request already in flight is not
/// aborted, its continuation is suppressed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next tick boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
