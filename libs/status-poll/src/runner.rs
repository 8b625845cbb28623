//! The poll loop: repeated status requests until the review settles

use crate::classify::{classify, ReviewStatus};
use crate::error::PollError;
use crate::progress::{Progress, ProgressObserver};
use crate::session::{CancelToken, PollOptions};
use crate::snapshot::StatusSnapshot;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Error a status source may surface from one request.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Where the poll loop gets its answers from.
///
/// The backend HTTP client implements this; tests script responses through
/// doubles.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// One-shot "already completed" check, consulted before the first tick.
    ///
    /// Returns the completion's status description when the review no longer
    /// needs polling.
    async fn completed_review(&self, resource_id: &str) -> Result<Option<String>, SourceError>;

    /// Fetch the raw status response for one attempt.
    async fn review_status(&self, resource_id: &str) -> Result<String, SourceError>;
}

/// Final report of a poll session.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub resource_id: String,
    /// Terminal review state, or `Timeout`/`Stopped` when the session ended
    /// without one.
    pub outcome: ReviewStatus,
    pub attempts: u32,
    pub elapsed: Duration,
    /// Snapshot of the last status response that arrived, if any did.
    pub last_snapshot: Option<StatusSnapshot>,
}

impl PollReport {
    /// Whether the session ended on a terminal review state.
    pub fn is_success(&self) -> bool {
        self.outcome.is_terminal()
    }
}

/// Poll `source` for `resource_id` until a terminal state is reached, the
/// attempt budget is exhausted, or `cancel` is flagged, whichever happens
/// first.
///
/// A failed status request does not abort the session: the tick is surfaced
/// to the observer as [`ReviewStatus::Error`] and polling continues on
/// schedule. Cancellation is cooperative and only observed at tick
/// boundaries; a request already in flight runs to completion but its result
/// no longer starts a new tick.
pub async fn run_session<S>(
    source: &S,
    resource_id: &str,
    options: PollOptions,
    cancel: &CancelToken,
    observer: &dyn ProgressObserver,
) -> Result<PollReport, PollError>
where
    S: StatusSource + ?Sized,
{
    if resource_id.trim().is_empty() {
        return Err(PollError::EmptyResourceId);
    }

    let started = Instant::now();
    let report = |outcome, attempts, last_snapshot| PollReport {
        resource_id: resource_id.to_string(),
        outcome,
        attempts,
        elapsed: started.elapsed(),
        last_snapshot,
    };

    // A review that already completed needs no polling at all.
    match source.completed_review(resource_id).await {
        Ok(Some(description)) => {
            let outcome = match classify(&description) {
                // Descriptions like "Completed" classify on their own; bare
                // or unrecognized ones still mean the review is done.
                ReviewStatus::Pending | ReviewStatus::Error => ReviewStatus::Complete,
                status => status,
            };
            observer.on_progress(&Progress {
                attempt: 0,
                max_attempts: options.max_attempts,
                status: outcome,
                elapsed: started.elapsed(),
            });
            tracing::info!(resource_id, status = %outcome, "review already completed, skipping polling");
            return Ok(report(outcome, 0, None));
        }
        Ok(None) => {}
        Err(error) => {
            tracing::warn!(resource_id, %error, "completion pre-check failed, polling anyway");
        }
    }

    let mut attempts = 0u32;
    let mut last_snapshot: Option<StatusSnapshot> = None;

    loop {
        if cancel.is_cancelled() {
            observer.on_progress(&Progress {
                attempt: attempts,
                max_attempts: options.max_attempts,
                status: ReviewStatus::Stopped,
                elapsed: started.elapsed(),
            });
            tracing::info!(resource_id, attempts, "polling stopped by caller");
            return Ok(report(ReviewStatus::Stopped, attempts, last_snapshot));
        }

        attempts += 1;
        observer.on_progress(&Progress {
            attempt: attempts,
            max_attempts: options.max_attempts,
            status: ReviewStatus::Polling,
            elapsed: started.elapsed(),
        });

        match source.review_status(resource_id).await {
            Ok(raw) => {
                let snapshot = StatusSnapshot::from_raw(raw);
                let status = snapshot.status;
                observer.on_progress(&Progress {
                    attempt: attempts,
                    max_attempts: options.max_attempts,
                    status,
                    elapsed: started.elapsed(),
                });
                tracing::debug!(resource_id, attempt = attempts, %status, "status response classified");
                last_snapshot = Some(snapshot);

                if status.is_terminal() {
                    return Ok(report(status, attempts, last_snapshot));
                }
            }
            Err(error) => {
                // One failed tick is not fatal; keep the schedule.
                tracing::warn!(resource_id, attempt = attempts, %error, "status request failed");
                observer.on_progress(&Progress {
                    attempt: attempts,
                    max_attempts: options.max_attempts,
                    status: ReviewStatus::Error,
                    elapsed: started.elapsed(),
                });
            }
        }

        if attempts >= options.max_attempts {
            observer.on_progress(&Progress {
                attempt: attempts,
                max_attempts: options.max_attempts,
                status: ReviewStatus::Timeout,
                elapsed: started.elapsed(),
            });
            tracing::warn!(resource_id, attempts, "attempt budget exhausted before a terminal state");
            return Ok(report(ReviewStatus::Timeout, attempts, last_snapshot));
        }

        tokio::time::sleep(options.interval).await;
    }
}
