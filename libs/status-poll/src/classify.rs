//! Status classification for raw review responses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simplified status of a prior-authorization review.
///
/// The backend embeds well-known literals ("Approved", "Denied", ...) in
/// otherwise unstructured response text; [`classify`] maps that text onto
/// this vocabulary. The non-review variants (`Polling`, `Timeout`,
/// `Stopped`) describe the session itself and are produced by the poll loop,
/// never by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    /// No decision yet; polling should continue.
    Pending,
    /// A status request for the current attempt is in flight.
    Polling,
    Approved,
    Denied,
    Pended,
    Complete,
    /// The response reported an error, or the attempt itself failed.
    Error,
    /// The attempt budget ran out before a decision arrived.
    Timeout,
    /// The caller cancelled the session.
    Stopped,
}

impl ReviewStatus {
    /// Whether further polling is useless.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReviewStatus::Approved
                | ReviewStatus::Denied
                | ReviewStatus::Pended
                | ReviewStatus::Complete
        )
    }

    /// Display label, matching the literals the backend uses.
    pub fn label(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "Pending",
            ReviewStatus::Polling => "Polling",
            ReviewStatus::Approved => "Approved",
            ReviewStatus::Denied => "Denied",
            ReviewStatus::Pended => "Pended",
            ReviewStatus::Complete => "Complete",
            ReviewStatus::Error => "Error",
            ReviewStatus::Timeout => "Timeout",
            ReviewStatus::Stopped => "Stopped",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Literals checked against the response text, in precedence order.
/// First match wins regardless of where it occurs in the text.
const PRECEDENCE: [(&str, ReviewStatus); 5] = [
    ("Approved", ReviewStatus::Approved),
    ("Denied", ReviewStatus::Denied),
    ("Pended", ReviewStatus::Pended),
    ("Complete", ReviewStatus::Complete),
    ("Error", ReviewStatus::Error),
];

/// Classify a raw status response.
///
/// Substring containment against a fixed precedence list; text matching
/// nothing classifies as [`ReviewStatus::Pending`].
pub fn classify(raw: &str) -> ReviewStatus {
    for (needle, status) in PRECEDENCE {
        if raw.contains(needle) {
            return status;
        }
    }
    ReviewStatus::Pending
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_literal_anywhere_in_text() {
        assert_eq!(
            classify("Status Check\nPrior authorization status: Approved foo\nResource ID: 17"),
            ReviewStatus::Approved
        );
        assert_eq!(classify("xx Denied xx"), ReviewStatus::Denied);
    }

    #[test]
    fn precedence_beats_occurrence_order() {
        // "Pending" appears first but carries no precedence; "Denied" wins.
        assert_eq!(
            classify("Status: Pending ... later the payer Denied the request"),
            ReviewStatus::Denied
        );
        // "Complete" occurs before "Approved" in the text, but "Approved"
        // ranks higher in the precedence list.
        assert_eq!(
            classify("Complete response attached; outcome Approved"),
            ReviewStatus::Approved
        );
    }

    #[test]
    fn unmatched_text_is_pending() {
        assert_eq!(classify("Status: In Process"), ReviewStatus::Pending);
        assert_eq!(classify(""), ReviewStatus::Pending);
    }

    #[test]
    fn error_ranks_last() {
        assert_eq!(classify("Error while Pended"), ReviewStatus::Pended);
        assert_eq!(classify("Error: connection reset"), ReviewStatus::Error);
    }

    #[test]
    fn terminal_states_are_exactly_the_decided_ones() {
        for status in [
            ReviewStatus::Approved,
            ReviewStatus::Denied,
            ReviewStatus::Pended,
            ReviewStatus::Complete,
        ] {
            assert!(status.is_terminal(), "{status} should be terminal");
        }
        for status in [
            ReviewStatus::Pending,
            ReviewStatus::Polling,
            ReviewStatus::Error,
            ReviewStatus::Timeout,
            ReviewStatus::Stopped,
        ] {
            assert!(!status.is_terminal(), "{status} should not be terminal");
        }
    }
}
