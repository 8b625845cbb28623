//! Per-attempt view of a status response

use crate::classify::{classify, ReviewStatus};
use serde_json::Value;

/// What one poll attempt learned about the review.
///
/// Only the latest snapshot is retained by the loop; earlier attempts are
/// discarded once superseded.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    /// The response body exactly as received.
    pub raw: String,
    /// The JSON payload embedded in the body, when one parses.
    pub json: Option<Value>,
    /// Classification of the raw text.
    pub status: ReviewStatus,
}

impl StatusSnapshot {
    /// Build a snapshot from a raw response body.
    ///
    /// The backend interleaves human-readable lines with a JSON payload; the
    /// payload, when present, spans the first `{` to the last `}` of the
    /// body. A span that does not parse leaves `json` empty while keeping
    /// the raw text.
    pub fn from_raw(raw: String) -> Self {
        let json = extract_embedded_json(&raw);
        let status = classify(&raw);
        Self { raw, json, status }
    }
}

fn extract_embedded_json(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_payload_wrapped_in_text() {
        let raw = "Status Check\nStatus: Approved\n{\"statusCode\": \"4\", \"id\": \"sr-1\"}\nend";
        let snapshot = StatusSnapshot::from_raw(raw.to_string());
        assert_eq!(snapshot.status, ReviewStatus::Approved);
        assert_eq!(
            snapshot.json,
            Some(json!({"statusCode": "4", "id": "sr-1"}))
        );
        assert_eq!(snapshot.raw, raw);
    }

    #[test]
    fn plain_text_has_no_payload() {
        let snapshot = StatusSnapshot::from_raw("Status: In Process".to_string());
        assert_eq!(snapshot.json, None);
        assert_eq!(snapshot.status, ReviewStatus::Pending);
    }

    #[test]
    fn unparseable_span_is_ignored() {
        let snapshot = StatusSnapshot::from_raw("oops {not json} trailing".to_string());
        assert_eq!(snapshot.json, None);
        assert_eq!(snapshot.raw, "oops {not json} trailing");
    }

    #[test]
    fn reversed_braces_are_ignored() {
        let snapshot = StatusSnapshot::from_raw("} backwards {".to_string());
        assert_eq!(snapshot.json, None);
    }
}
