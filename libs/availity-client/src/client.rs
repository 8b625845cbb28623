//! HTTP client for the prior-authorization backend

use crate::error::{Error, Result};
use crate::models::{
    AuthProbe, PollingCheck, SubmitReceipt, TrackerCallDetail, TrackerPage, TrackerQuery,
};
use crate::scrape;
use async_trait::async_trait;
use priorflow_poll::{SourceError, StatusSource};
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the backend's prior-auth, tracker, and mapper endpoints.
///
/// Paths are joined onto the base URL as absolute paths; a base of
/// `http://host:8080` serves all endpoints.
pub struct PriorAuthClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PriorAuthClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Submit a prior-authorization request.
    ///
    /// The backend answers with free text; success carries a
    /// `Resource ID: <id>` marker. Text without one is a business error
    /// carrying the server's message.
    pub async fn submit(&self) -> Result<SubmitReceipt> {
        let url = self.endpoint("/prior-auth/submit")?;
        tracing::info!(%url, "submitting prior-authorization request");
        let response = self.http.post(url).send().await?;
        let body = Self::text_or_status(response).await?;

        match scrape::resource_id(&body).map(str::to_string) {
            Some(resource_id) => {
                tracing::info!(%resource_id, "submission accepted");
                Ok(SubmitReceipt {
                    resource_id,
                    raw: body,
                })
            }
            None => Err(Error::Business(body)),
        }
    }

    /// Raw status text for a submission (free text plus embedded JSON).
    pub async fn review_status_text(&self, resource_id: &str) -> Result<String> {
        self.get_text(&format!("/prior-auth/submit/{resource_id}/status"))
            .await
    }

    /// Structured completion check for a submission.
    pub async fn polling_check(&self, resource_id: &str) -> Result<PollingCheck> {
        self.get_json(&format!("/prior-auth/polling/{resource_id}"))
            .await
    }

    /// Probe the backend's authentication against the payer.
    pub async fn auth_probe(&self) -> Result<AuthProbe> {
        let body = self.get_text("/prior-auth/auth").await?;
        let token = if body.contains("Authentication successful") {
            scrape::token(&body).map(str::to_string)
        } else {
            None
        };
        Ok(AuthProbe { token, raw: body })
    }

    /// One page of the tracked API call log.
    pub async fn tracker_calls(&self, query: &TrackerQuery) -> Result<TrackerPage> {
        let mut url = self.endpoint("/api/tracker/calls")?;
        url.query_pairs_mut()
            .append_pair("endpoint", &query.endpoint)
            .append_pair("dateRange", &query.date_range)
            .append_pair("page", &query.page.to_string())
            .append_pair("pageSize", &query.page_size.to_string());
        let response = self.http.get(url).send().await?;
        let body = Self::text_or_status(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Payload detail of one tracked call.
    pub async fn tracker_call(&self, id: &str) -> Result<TrackerCallDetail> {
        self.get_json(&format!("/api/tracker/calls/{id}")).await
    }

    /// Delete every tracked call.
    pub async fn clear_tracker(&self) -> Result<()> {
        let url = self.endpoint("/api/tracker/calls")?;
        let response = self.http.delete(url).send().await?;
        Self::text_or_status(response).await?;
        tracing::info!("tracker call log cleared");
        Ok(())
    }

    /// Convert a FHIR Claim to an Availity service review via the remote
    /// mapper.
    pub async fn fhir_to_availity(&self, claim: &Value) -> Result<Value> {
        self.map_payload("/api/mapper/fhir-to-availity", claim).await
    }

    /// Convert an Availity service review to a FHIR Claim via the remote
    /// mapper.
    pub async fn availity_to_fhir(&self, review: &Value) -> Result<Value> {
        self.map_payload("/api/mapper/availity-to-fhir", review).await
    }

    async fn map_payload(&self, path: &str, payload: &Value) -> Result<Value> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "requesting mapper conversion");
        let response = self.http.post(url).json(payload).send().await?;
        let body = Self::text_or_status(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let url = self.endpoint(path)?;
        let response = self.http.get(url).send().await?;
        Self::text_or_status(response).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_text(path).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Body of a 2xx response; anything else becomes a status error that
    /// keeps the body for diagnostics.
    async fn text_or_status(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl StatusSource for PriorAuthClient {
    async fn completed_review(
        &self,
        resource_id: &str,
    ) -> std::result::Result<Option<String>, SourceError> {
        let check = self.polling_check(resource_id).await?;
        if check.completed {
            Ok(Some(check.status_description.unwrap_or_default()))
        } else {
            Ok(None)
        }
    }

    async fn review_status(&self, resource_id: &str) -> std::result::Result<String, SourceError> {
        Ok(self.review_status_text(resource_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            PriorAuthClient::new("not a url"),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn joins_endpoints_onto_the_base() {
        let client = PriorAuthClient::new("http://localhost:8080").unwrap();
        let url = client.endpoint("/prior-auth/submit/sr-1/status").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/prior-auth/submit/sr-1/status"
        );
    }
}
