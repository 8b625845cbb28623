//! Single-slot persistence for the last prior-authorization submission.
//!
//! One record survives at a time: saving overwrites the slot, a new
//! submission clears it first. The slot exists so a later invocation can show
//! the previous submission's result without resubmitting; it is not a
//! correctness-critical cache and has no eviction policy beyond overwrite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cache record is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Polling outcome summary stored alongside the submission result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingSummary {
    pub attempts: u32,
    /// Elapsed wall-clock seconds; informational only.
    pub time: u64,
    pub status: String,
    pub success: bool,
}

/// The one record the slot holds.
///
/// Field names keep the camelCase keys of the record this store replaces, so
/// existing tooling that inspects the file keeps working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availity_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polling_status: Option<PollingSummary>,
    pub timestamp: DateTime<Utc>,
}

impl CacheRecord {
    /// Record for a submission that has not been polled yet.
    pub fn submitted(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            availity_json: None,
            fhir_json: None,
            polling_status: None,
            timestamp: Utc::now(),
        }
    }
}

/// Trait for result-slot implementations.
///
/// Implement this to back the slot with something other than the local file
/// system.
pub trait ResultCache: Send + Sync {
    /// Overwrite the slot.
    fn save(&self, record: &CacheRecord) -> Result<()>;

    /// Load the slot, `None` when empty.
    fn load(&self) -> Result<Option<CacheRecord>>;

    /// Empty the slot.
    fn clear(&self) -> Result<()>;
}

/// File-system slot: one JSON file, overwritten on every save.
///
/// Defaults to `~/.priorflow/last-submission.json`.
pub struct FileSlotCache {
    path: PathBuf,
}

impl FileSlotCache {
    pub fn new(directory: Option<PathBuf>) -> Self {
        let dir = directory.unwrap_or_else(Self::default_directory);
        Self {
            path: dir.join("last-submission.json"),
        }
    }

    fn default_directory() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".priorflow")
    }

    /// Location of the slot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultCache for FileSlotCache {
    fn save(&self, record: &CacheRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), resource_id = %record.resource_id, "cache slot written");
        Ok(())
    }

    fn load(&self) -> Result<Option<CacheRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        let record = serde_json::from_str(&contents)?;
        Ok(Some(record))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "cache slot cleared");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> CacheRecord {
        CacheRecord {
            resource_id: id.to_string(),
            availity_json: Some("{\"statusCode\": \"4\"}".to_string()),
            fhir_json: None,
            polling_status: Some(PollingSummary {
                attempts: 3,
                time: 6,
                status: "Approved".to_string(),
                success: true,
            }),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn round_trips_a_record() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileSlotCache::new(Some(dir.path().to_path_buf()));

        let saved = record("sr-42");
        cache.save(&saved).unwrap();
        let loaded = cache.load().unwrap().expect("slot holds a record");
        assert_eq!(loaded, saved);
    }

    #[test]
    fn save_overwrites_the_slot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileSlotCache::new(Some(dir.path().to_path_buf()));

        cache.save(&record("sr-first")).unwrap();
        cache.save(&record("sr-second")).unwrap();
        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded.resource_id, "sr-second");
    }

    #[test]
    fn clear_then_load_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileSlotCache::new(Some(dir.path().to_path_buf()));

        cache.save(&record("sr-9")).unwrap();
        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn empty_slot_loads_as_none_and_clears_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileSlotCache::new(Some(dir.path().to_path_buf()));

        assert!(cache.load().unwrap().is_none());
        cache.clear().unwrap();
    }

    #[test]
    fn record_keys_stay_camel_case() {
        let json = serde_json::to_value(record("sr-7")).unwrap();
        assert!(json.get("resourceId").is_some());
        assert!(json.get("availityJson").is_some());
        assert!(json.get("pollingStatus").is_some());
        assert_eq!(json["pollingStatus"]["success"], true);
    }
}
