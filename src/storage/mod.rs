//! JSON files kept in the output directory between runs

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::errors::{PersistenceError, PersistenceResult};
use crate::models::{Catalog, CatalogSnapshot};
use crate::tracker::DiffResult;

/// Read a JSON document, `Ok(None)` when the file does not exist
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> PersistenceResult<Option<T>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PersistenceError::read(path, e)),
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| PersistenceError::serialization(path, e))
}

/// Write a value as pretty-printed JSON, creating parent directories
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> PersistenceResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PersistenceError::write(parent, e))?;
    }

    let json =
        serde_json::to_string_pretty(value).map_err(|e| PersistenceError::serialization(path, e))?;
    std::fs::write(path, json).map_err(|e| PersistenceError::write(path, e))?;

    debug!("Wrote {}", path.display());
    Ok(())
}

/// Catalog Store: the persisted catalog and the diff report
#[derive(Debug, Clone)]
pub struct CatalogStore {
    catalog_path: PathBuf,
    diff_report_path: PathBuf,
}

impl CatalogStore {
    pub fn new<C: Into<PathBuf>, D: Into<PathBuf>>(catalog_path: C, diff_report_path: D) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            diff_report_path: diff_report_path.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.catalog_path(), config.diff_report_path())
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn diff_report_path(&self) -> &Path {
        &self.diff_report_path
    }

    /// The catalog written by the previous run; `None` on a first run
    pub fn load_previous(&self) -> PersistenceResult<Option<CatalogSnapshot>> {
        let snapshot = read_json_file::<CatalogSnapshot>(&self.catalog_path)?;
        match &snapshot {
            Some(previous) => debug!(
                "Loaded previous catalog with {} channels in {} groups",
                previous.catalog().total_channels(),
                previous.catalog().total_groups()
            ),
            None => info!(
                "No previous catalog at {}, treating this as the first run",
                self.catalog_path.display()
            ),
        }
        Ok(snapshot)
    }

    pub fn save(&self, catalog: &Catalog, updated: DateTime<Utc>) -> PersistenceResult<CatalogSnapshot> {
        let snapshot = CatalogSnapshot::new(catalog.clone(), updated);
        write_json_file(&self.catalog_path, &snapshot)?;
        info!(
            "Saved catalog with {} channels in {} groups to {}",
            snapshot.total_channels,
            snapshot.total_groups,
            self.catalog_path.display()
        );
        Ok(snapshot)
    }

    pub fn save_diff_report(&self, diff: &DiffResult) -> PersistenceResult<()> {
        write_json_file(&self.diff_report_path, diff)
    }
}
