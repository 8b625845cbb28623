//! Typed views of the backend's responses

use serde::Deserialize;
use serde_json::Value;

/// Outcome of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    /// Server-assigned id used as the polling key.
    pub resource_id: String,
    /// Full response text, kept for display.
    pub raw: String,
}

/// Answer of `GET /prior-auth/polling/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingCheck {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub status_description: Option<String>,
}

/// Outcome of the authentication probe.
#[derive(Debug, Clone)]
pub struct AuthProbe {
    /// Present only when the backend reported a successful authentication.
    pub token: Option<String>,
    pub raw: String,
}

impl AuthProbe {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Filter and paging parameters for the tracker call log.
#[derive(Debug, Clone)]
pub struct TrackerQuery {
    /// Endpoint filter; `all` disables it.
    pub endpoint: String,
    /// One of `all`, `today`, `yesterday`, `week`, `month`.
    pub date_range: String,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for TrackerQuery {
    fn default() -> Self {
        Self {
            endpoint: "all".to_string(),
            date_range: "all".to_string(),
            page: 1,
            page_size: 10,
        }
    }
}

/// One tracked API call, as listed by the tracker.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerCall {
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub endpoint: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub client_ip: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One page of tracked calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerPage {
    #[serde(default)]
    pub calls: Vec<TrackerCall>,
    #[serde(default)]
    pub total_calls: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub page_size: u32,
}

/// Payload detail of one tracked call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerCallDetail {
    #[serde(default)]
    pub fhir_payload: Option<Value>,
    #[serde(default)]
    pub availity_payload: Option<Value>,
    #[serde(default)]
    pub response: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polling_check_tolerates_missing_description() {
        let check: PollingCheck = serde_json::from_str("{\"completed\": true}").unwrap();
        assert!(check.completed);
        assert_eq!(check.status_description, None);

        let check: PollingCheck =
            serde_json::from_str("{\"completed\": false, \"statusDescription\": \"In Process\"}")
                .unwrap();
        assert!(!check.completed);
        assert_eq!(check.status_description.as_deref(), Some("In Process"));
    }

    #[test]
    fn tracker_page_parses_the_backend_shape() {
        let json = r#"{
            "calls": [{
                "id": "c-1",
                "timestamp": "2026-08-07T10:15:00",
                "endpoint": "/submit",
                "method": "POST",
                "clientIp": "10.0.0.5",
                "requestId": "REQ-1A2B3C4D",
                "status": "Pending"
            }],
            "totalCalls": 1,
            "totalPages": 1,
            "currentPage": 1,
            "pageSize": 10
        }"#;
        let page: TrackerPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.calls.len(), 1);
        assert_eq!(page.calls[0].request_id.as_deref(), Some("REQ-1A2B3C4D"));
        assert_eq!(page.total_pages, 1);
    }
}
