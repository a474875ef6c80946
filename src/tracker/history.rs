use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::DiffResult;
use crate::config::{OutputConfig, TrackerConfig};
use crate::errors::PersistenceResult;
use crate::storage::{read_json_file, write_json_file};
use crate::utils::datetime::{deserialize_lenient_datetime, serialize_optional_datetime};

/// Summary of one run in the history log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(
        default,
        serialize_with = "serialize_optional_datetime",
        deserialize_with = "deserialize_lenient_datetime"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "added")]
    pub added_count: usize,
    #[serde(default, alias = "removed")]
    pub removed_count: usize,
    #[serde(default, alias = "modified")]
    pub modified_count: usize,
    #[serde(default, alias = "total")]
    pub total_channels: usize,
}

impl HistoryEntry {
    pub fn from_diff(diff: &DiffResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            added_count: diff.added,
            removed_count: diff.removed,
            modified_count: diff.modified,
            total_channels: diff.total,
        }
    }
}

/// Put an entry at the front of a newest-first log, evicting past `limit`
pub fn push_entry(entries: &mut Vec<HistoryEntry>, entry: HistoryEntry, limit: usize) {
    entries.insert(0, entry);
    entries.truncate(limit);
}

/// Rolling run history, newest first
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
    limit: usize,
}

impl HistoryLog {
    pub fn new<P: Into<PathBuf>>(path: P, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }

    pub fn from_config(output: &OutputConfig, tracker: &TrackerConfig) -> Self {
        Self::new(output.history_path(), tracker.history_limit)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Entries on disk; an absent file is an empty history
    pub fn load(&self) -> PersistenceResult<Vec<HistoryEntry>> {
        Ok(read_json_file(&self.path)?.unwrap_or_default())
    }

    /// Add a run to entries read earlier with [`HistoryLog::load`] and write the log
    pub fn append(
        &self,
        mut entries: Vec<HistoryEntry>,
        entry: HistoryEntry,
    ) -> PersistenceResult<Vec<HistoryEntry>> {
        push_entry(&mut entries, entry, self.limit);
        write_json_file(&self.path, &entries)?;

        debug!(
            "History at {} now holds {} entries",
            self.path.display(),
            entries.len()
        );
        Ok(entries)
    }
}
