//! Async client for the prior-authorization backend.
//!
//! Wraps the backend's HTTP surface: submission and status of
//! prior-authorization reviews, the structured completion check, the
//! authentication probe, the API call tracker, and the FHIR⇄Availity mapper.
//! Submission and status responses are free text with embedded markers
//! ("Resource ID: <id>", "Status: <x>"); the [`scrape`] module keeps that
//! wire contract in one place.
//!
//! The [`submit_and_poll`] workflow ties the client to the polling core
//! (`priorflow-poll`) and the single-slot result cache (`priorflow-cache`).

mod client;
mod error;
mod models;
pub mod scrape;
mod workflow;

pub use client::{PriorAuthClient, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use models::{
    AuthProbe, PollingCheck, SubmitReceipt, TrackerCall, TrackerCallDetail, TrackerPage,
    TrackerQuery,
};
pub use workflow::{submit_and_poll, ReviewApi};
