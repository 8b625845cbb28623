//! Scraping helpers for the backend's free-text wire contract
//!
//! Submission, status, and auth responses embed their useful values in prose
//! ("Resource ID: <id>", "Status: <x>", "Token: <t>"). These helpers keep
//! that inherited contract in one place; classification semantics on top of
//! it live in `priorflow-poll`.

/// Extract the resource id following the `Resource ID:` marker.
///
/// The id runs to the first whitespace character after the marker.
pub fn resource_id(text: &str) -> Option<&str> {
    let rest = text.split_once("Resource ID:")?.1;
    rest.split_whitespace().next()
}

/// Extract the remainder of the `Status:` line, trimmed.
pub fn status_line(text: &str) -> Option<&str> {
    let rest = text.split_once("Status:")?.1;
    let line = rest.lines().next().unwrap_or(rest).trim();
    (!line.is_empty()).then_some(line)
}

/// Extract the token following the `Token:` marker.
pub fn token(text: &str) -> Option<&str> {
    let rest = text.split_once("Token:")?.1;
    rest.split_whitespace().next()
}
