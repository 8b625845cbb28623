//! Poll loop behavior against scripted status sources

use async_trait::async_trait;
use priorflow_poll::{
    run_session, CancelToken, NullObserver, PollError, PollOptions, Progress, ProgressObserver,
    ReviewStatus, SourceError, StatusSource,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Responds from a fixed script; repeats "In Process" once the script runs dry.
struct ScriptedSource {
    precheck: Result<Option<String>, String>,
    responses: Mutex<VecDeque<Result<String, String>>>,
    status_calls: AtomicU32,
}

impl ScriptedSource {
    fn new(
        precheck: Result<Option<String>, String>,
        responses: Vec<Result<String, String>>,
    ) -> Self {
        Self {
            precheck,
            responses: Mutex::new(responses.into_iter().collect()),
            status_calls: AtomicU32::new(0),
        }
    }

    fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn completed_review(&self, _resource_id: &str) -> Result<Option<String>, SourceError> {
        match &self.precheck {
            Ok(answer) => Ok(answer.clone()),
            Err(message) => Err(message.clone().into()),
        }
    }

    async fn review_status(&self, _resource_id: &str) -> Result<String, SourceError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(message)) => Err(message.into()),
            None => Ok("Status: In Process".to_string()),
        }
    }
}

/// Records every progress update the loop emits.
#[derive(Default)]
struct Recorder {
    updates: Mutex<Vec<Progress>>,
}

impl ProgressObserver for Recorder {
    fn on_progress(&self, progress: &Progress) {
        self.updates.lock().unwrap().push(progress.clone());
    }
}

fn options(max_attempts: u32) -> PollOptions {
    PollOptions {
        interval: Duration::ZERO,
        max_attempts,
    }
}

#[tokio::test]
async fn settles_on_first_terminal_response() {
    let source = ScriptedSource::new(
        Ok(None),
        vec![
            Ok("Status: In Process".to_string()),
            Ok("Status: Approved\n{\"statusCode\": \"A1\"}".to_string()),
        ],
    );

    let report = run_session(&source, "sr-1", options(10), &CancelToken::new(), &NullObserver)
        .await
        .unwrap();

    assert_eq!(report.outcome, ReviewStatus::Approved);
    assert_eq!(report.attempts, 2);
    assert!(report.is_success());
    let snapshot = report.last_snapshot.expect("terminal snapshot retained");
    assert_eq!(snapshot.json.unwrap()["statusCode"], "A1");
}

#[tokio::test]
async fn times_out_after_exact_attempt_budget() {
    let source = ScriptedSource::new(Ok(None), Vec::new());

    let report = run_session(&source, "sr-2", options(3), &CancelToken::new(), &NullObserver)
        .await
        .unwrap();

    assert_eq!(report.outcome, ReviewStatus::Timeout);
    assert_eq!(report.attempts, 3);
    assert_eq!(source.status_calls(), 3);
    assert!(!report.is_success());
}

#[tokio::test]
async fn precheck_completion_skips_polling() {
    let source = ScriptedSource::new(Ok(Some("Approved".to_string())), Vec::new());

    let report = run_session(&source, "sr-3", options(10), &CancelToken::new(), &NullObserver)
        .await
        .unwrap();

    assert_eq!(report.outcome, ReviewStatus::Approved);
    assert_eq!(report.attempts, 0);
    assert_eq!(source.status_calls(), 0, "no status request may be issued");
}

#[tokio::test]
async fn unrecognized_completion_description_reports_complete() {
    let source = ScriptedSource::new(Ok(Some("done".to_string())), Vec::new());

    let report = run_session(&source, "sr-4", options(10), &CancelToken::new(), &NullObserver)
        .await
        .unwrap();

    assert_eq!(report.outcome, ReviewStatus::Complete);
    assert_eq!(report.attempts, 0);
}

#[tokio::test]
async fn precheck_failure_falls_back_to_polling() {
    let source = ScriptedSource::new(
        Err("connection refused".to_string()),
        vec![Ok("Status: Denied".to_string())],
    );

    let report = run_session(&source, "sr-5", options(10), &CancelToken::new(), &NullObserver)
        .await
        .unwrap();

    assert_eq!(report.outcome, ReviewStatus::Denied);
    assert_eq!(report.attempts, 1);
}

#[tokio::test]
async fn failed_tick_keeps_polling_on_schedule() {
    let source = ScriptedSource::new(
        Ok(None),
        vec![
            Err("503 from upstream".to_string()),
            Ok("Status: Complete".to_string()),
        ],
    );
    let recorder = Recorder::default();

    let report = run_session(&source, "sr-6", options(10), &CancelToken::new(), &recorder)
        .await
        .unwrap();

    assert_eq!(report.outcome, ReviewStatus::Complete);
    assert_eq!(report.attempts, 2);

    let updates = recorder.updates.lock().unwrap();
    assert!(
        updates
            .iter()
            .any(|p| p.attempt == 1 && p.status == ReviewStatus::Error),
        "the failed tick must surface as an Error update"
    );
}

#[tokio::test]
async fn cancellation_stops_the_session() {
    let source = ScriptedSource::new(Ok(None), Vec::new());
    let cancel = CancelToken::new();
    cancel.cancel();

    let report = run_session(&source, "sr-7", options(10), &cancel, &NullObserver)
        .await
        .unwrap();

    assert_eq!(report.outcome, ReviewStatus::Stopped);
    assert_eq!(report.attempts, 0);
    assert_eq!(source.status_calls(), 0);
}

#[tokio::test]
async fn empty_resource_id_is_rejected() {
    let source = ScriptedSource::new(Ok(None), Vec::new());

    let result = run_session(&source, "  ", options(10), &CancelToken::new(), &NullObserver).await;

    assert!(matches!(result, Err(PollError::EmptyResourceId)));
    assert_eq!(source.status_calls(), 0);
}

#[tokio::test]
async fn progress_percentages_never_decrease() {
    let source = ScriptedSource::new(Ok(None), Vec::new());
    let recorder = Recorder::default();

    run_session(&source, "sr-8", options(5), &CancelToken::new(), &recorder)
        .await
        .unwrap();

    let updates = recorder.updates.lock().unwrap();
    let mut previous = -1.0;
    for progress in updates.iter() {
        let current = progress.percent();
        assert!(current >= previous, "{current} regressed below {previous}");
        previous = current;
    }
    assert_eq!(previous, 100.0);
}
