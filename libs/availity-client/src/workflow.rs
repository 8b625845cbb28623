//! Submit-and-poll orchestration
//!
//! Ties the backend client, the polling core, and the result slot together:
//! clear the slot, submit, pre-check, poll, persist the outcome.

use crate::error::Result;
use crate::models::SubmitReceipt;
use crate::PriorAuthClient;
use async_trait::async_trait;
use chrono::Utc;
use priorflow_cache::{CacheRecord, PollingSummary, ResultCache};
use priorflow_poll::{
    run_session, CancelToken, PollOptions, PollReport, ProgressObserver, StatusSource,
};
use serde_json::Value;

/// The slice of the backend API the workflow needs.
///
/// Split from [`PriorAuthClient`] so the orchestration is testable without a
/// backend.
#[async_trait]
pub trait ReviewApi: StatusSource {
    /// Submit a new prior-authorization request.
    async fn submit(&self) -> Result<SubmitReceipt>;

    /// Convert an Availity payload to FHIR via the remote mapper.
    async fn availity_to_fhir(&self, review: &Value) -> Result<Value>;
}

#[async_trait]
impl ReviewApi for PriorAuthClient {
    async fn submit(&self) -> Result<SubmitReceipt> {
        PriorAuthClient::submit(self).await
    }

    async fn availity_to_fhir(&self, review: &Value) -> Result<Value> {
        PriorAuthClient::availity_to_fhir(self, review).await
    }
}

/// Run one submission workflow.
///
/// With `existing_id` the submission step is skipped and the slot is left
/// alone; the record still belongs to the submission being re-polled.
/// Otherwise the slot is cleared before the submit request goes out, so a
/// fresh submission can never inherit a stale record, and a minimal record
/// with the new resource id is written as soon as the id is known.
///
/// After a terminal outcome the slot receives the full record: the final
/// Availity payload, its FHIR rendering (best-effort, via the remote
/// mapper), and the polling summary. Cache writes and the mapper round are
/// not correctness-critical; their failures are logged and swallowed.
pub async fn submit_and_poll<A, C>(
    api: &A,
    cache: &C,
    existing_id: Option<&str>,
    options: PollOptions,
    cancel: &CancelToken,
    observer: &dyn ProgressObserver,
) -> Result<PollReport>
where
    A: ReviewApi + ?Sized,
    C: ResultCache + ?Sized,
{
    let resource_id = match existing_id {
        Some(id) => id.to_string(),
        None => {
            // The slot must be empty before the submit request is issued.
            cache.clear()?;
            let receipt = api.submit().await?;
            if let Err(error) = cache.save(&CacheRecord::submitted(receipt.resource_id.as_str())) {
                tracing::warn!(%error, "could not persist submission record");
            }
            receipt.resource_id
        }
    };

    let report = run_session(api, &resource_id, options, cancel, observer).await?;

    if report.is_success() {
        let availity_json = report
            .last_snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.json.as_ref());

        let fhir_json = match availity_json {
            Some(json) => match api.availity_to_fhir(json).await {
                Ok(claim) => serde_json::to_string_pretty(&claim).ok(),
                Err(error) => {
                    tracing::warn!(%error, "mapper conversion of the final payload failed");
                    None
                }
            },
            None => None,
        };

        let record = CacheRecord {
            resource_id: report.resource_id.clone(),
            availity_json: availity_json.and_then(|json| serde_json::to_string_pretty(json).ok()),
            fhir_json,
            polling_status: Some(PollingSummary {
                attempts: report.attempts,
                time: report.elapsed.as_secs(),
                status: report.outcome.label().to_string(),
                success: true,
            }),
            timestamp: Utc::now(),
        };
        if let Err(error) = cache.save(&record) {
            tracing::warn!(%error, "could not persist polling result");
        }
    }

    Ok(report)
}
