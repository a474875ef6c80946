use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod channel;

pub use channel::{Catalog, Channel, RawRecord};

use crate::utils::datetime::{deserialize_lenient_datetime, serialize_optional_datetime};

/// On-disk form of a catalog, written every run and read back as the
/// previous state on the next one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(
        default,
        serialize_with = "serialize_optional_datetime",
        deserialize_with = "deserialize_lenient_datetime"
    )]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_channels: usize,
    #[serde(default)]
    pub total_groups: usize,
    #[serde(default)]
    pub groups: Catalog,
}

impl CatalogSnapshot {
    pub fn new(catalog: Catalog, updated: DateTime<Utc>) -> Self {
        Self {
            updated: Some(updated),
            total_channels: catalog.total_channels(),
            total_groups: catalog.total_groups(),
            groups: catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.groups
    }

    pub fn into_catalog(self) -> Catalog {
        self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_reads_legacy_naive_timestamp() {
        let snapshot: CatalogSnapshot = serde_json::from_value(json!({
            "updated": "2024-05-01T10:00:00.512000",
            "total_channels": 1,
            "total_groups": 1,
            "groups": {
                "Germany": [
                    {"name": "ARD", "display_name": "ARD", "group": "Germany",
                     "logo": "", "url": "u1", "hls": ""}
                ]
            }
        }))
        .unwrap();

        assert!(snapshot.updated.is_some());
        assert_eq!(snapshot.catalog().total_channels(), 1);
        assert_eq!(snapshot.catalog().group("Germany").unwrap()[0].primary_url, "u1");
    }

    #[test]
    fn test_snapshot_tolerates_missing_metadata() {
        let snapshot: CatalogSnapshot =
            serde_json::from_value(json!({"groups": {"Austria": []}})).unwrap();
        assert_eq!(snapshot.updated, None);
        assert!(snapshot.catalog().contains_group("Austria"));
    }
}
