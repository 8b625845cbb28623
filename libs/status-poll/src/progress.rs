//! Progress projection for an active poll session

use crate::classify::ReviewStatus;
use std::time::Duration;

/// Display-ready view of polling progress.
///
/// Pure projection of (attempt, budget, status, elapsed); computing labels
/// has no side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub attempt: u32,
    pub max_attempts: u32,
    pub status: ReviewStatus,
    pub elapsed: Duration,
}

impl Progress {
    /// Consumed share of the attempt budget, as a percentage.
    pub fn percent(&self) -> f64 {
        if self.max_attempts == 0 {
            return 0.0;
        }
        f64::from(self.attempt) / f64::from(self.max_attempts) * 100.0
    }

    /// "attempt/budget" label, e.g. `3/10`.
    pub fn attempt_label(&self) -> String {
        format!("{}/{}", self.attempt, self.max_attempts)
    }

    /// Whole-second elapsed label, e.g. `12s`.
    pub fn elapsed_label(&self) -> String {
        format!("{}s", self.elapsed.as_secs())
    }

    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }
}

/// Receives the progress updates the poll loop emits.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: &Progress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&Progress) + Send + Sync,
{
    fn on_progress(&self, progress: &Progress) {
        self(progress)
    }
}

/// Observer that discards every update.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_progress(&self, _progress: &Progress) {}
}
