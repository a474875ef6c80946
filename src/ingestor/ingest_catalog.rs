use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::FeedProvider;
use crate::config::FeedsConfig;
use crate::errors::{FeedError, FeedResult};
use crate::models::RawRecord;

/// Secondary feed: a signed, per-group, cursor-paged catalog API
///
/// A run obtains an addon signature, discovers the available groups (falling
/// back to a configured list) and pages through every group.
pub struct CatalogFeedProvider {
    config: FeedsConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SignatureResponse {
    #[serde(rename = "addonSig", default)]
    addon_sig: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryResponse {
    #[serde(default)]
    features: DirectoryFeatures,
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryFeatures {
    #[serde(default)]
    filter: Vec<DirectoryFilter>,
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryFilter {
    #[serde(default)]
    values: Vec<DirectoryValue>,
}

#[derive(Debug, Deserialize)]
struct DirectoryValue {
    #[serde(default)]
    value: Option<String>,
}

/// One page of catalog items
#[derive(Debug, Default, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub items: Vec<RawRecord>,
    #[serde(rename = "nextCursor", default)]
    pub next_cursor: Option<Value>,
}

impl CatalogPage {
    /// Cursor for the following page, if the API announced one
    pub fn next(&self) -> Option<&Value> {
        match &self.next_cursor {
            None | Some(Value::Null) | Some(Value::Bool(false)) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::Number(n)) if n.as_i64() == Some(0) => None,
            Some(cursor) => Some(cursor),
        }
    }
}

impl CatalogFeedProvider {
    pub fn new(config: FeedsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.index_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    fn aux_timeout(&self) -> Duration {
        Duration::from_secs(self.config.aux_timeout_secs)
    }

    async fn fetch_signature(&self) -> FeedResult<String> {
        let payload = json!({
            "token": "",
            "reason": "boot",
            "locale": self.config.catalog_language,
            "theme": "dark",
            "metadata": {
                "device": {"type": "desktop", "uniqueId": ""},
                "os": {"name": "win32", "version": "Windows 10", "abis": ["x64"], "host": "DESKTOP"},
                "app": {"platform": "electron"},
                "version": {"package": "app.lokke.main", "binary": "1.0.19", "js": "1.0.19"}
            },
            "appFocusTime": 173,
            "playerActive": false,
            "playDuration": 0,
            "devMode": true,
            "hasAddon": true,
            "castConnected": false,
            "package": "app.lokke.main",
            "version": "1.0.19",
            "process": "app",
            "ipLocation": 0,
            "adblockEnabled": true,
            "proxy": {"supported": ["ss"], "engine": "cu", "enabled": false, "autoServer": true, "id": 0},
            "iap": {"supported": false}
        });

        let response: SignatureResponse = self
            .client
            .post(&self.config.signature_url)
            .timeout(self.aux_timeout())
            .header("user-agent", &self.config.signature_user_agent)
            .header("accept", "application/json")
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .addon_sig
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FeedError::missing_signature(&self.config.signature_url))
    }

    async fn fetch_groups(&self, signature: &str) -> FeedResult<Vec<String>> {
        let response: DirectoryResponse = self
            .client
            .post(&self.config.groups_url)
            .timeout(self.aux_timeout())
            .header("user-agent", &self.config.groups_user_agent)
            .header("accept", "application/json")
            .header("cookie", "lng=")
            .header("watched-sig", signature)
            .json(&json!({"adult": true, "cursor": 0, "sort": "name"}))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(groups_from_directory(response))
    }

    /// Groups from the directory endpoint, or the configured fallback list
    async fn resolve_groups(&self, signature: &str) -> Vec<String> {
        match self.fetch_groups(signature).await {
            Ok(groups) if !groups.is_empty() => groups,
            Ok(_) => {
                warn!("Group directory was empty, using fallback groups");
                self.config.fallback_groups.clone()
            }
            Err(e) => {
                warn!("Error fetching groups, using fallback groups: {}", e);
                self.config.fallback_groups.clone()
            }
        }
    }

    async fn fetch_page(&self, signature: &str, group: &str, cursor: &Value) -> FeedResult<CatalogPage> {
        let body = json!({
            "language": self.config.catalog_language,
            "region": self.config.catalog_region,
            "catalogId": "iptv",
            "id": "iptv",
            "adult": false,
            "search": "",
            "sort": "name",
            "filter": {"group": group},
            "cursor": cursor,
            "clientVersion": self.config.catalog_client_version,
        });

        let page = self
            .client
            .post(&self.config.catalog_url)
            .header("user-agent", &self.config.catalog_user_agent)
            .header("accept", "application/json")
            .header("mediahubmx-signature", signature)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(page)
    }

    /// Page through one group; a failing page ends the group but keeps earlier pages
    async fn fetch_group(&self, signature: &str, group: &str) -> Vec<RawRecord> {
        let mut records = Vec::new();
        let mut cursor = Value::from(0);

        for page_number in 0..self.config.max_pages_per_group {
            let page = match self.fetch_page(signature, group, &cursor).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Error fetching catalog page {} for {}: {}", page_number, group, e);
                    break;
                }
            };

            let next = page.next().cloned();
            records.extend(page.items.into_iter().map(|record| assign_group(record, group)));

            match next {
                Some(next_cursor) => cursor = next_cursor,
                None => break,
            }
        }

        debug!("Fetched {} catalog records for group {}", records.len(), group);
        records
    }
}

#[async_trait]
impl FeedProvider for CatalogFeedProvider {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn fetch(&self) -> FeedResult<Vec<RawRecord>> {
        let signature = self.fetch_signature().await?;
        let groups = self.resolve_groups(&signature).await;

        let mut all_records = Vec::new();
        for group in &groups {
            info!("Fetching catalog channels for group: {}", group);
            all_records.extend(self.fetch_group(&signature, group).await);
        }

        Ok(all_records)
    }
}

fn groups_from_directory(response: DirectoryResponse) -> Vec<String> {
    response
        .features
        .filter
        .into_iter()
        .next()
        .map(|filter| {
            filter
                .values
                .into_iter()
                .filter_map(|v| v.value)
                .filter(|v| !v.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Items without a group of their own belong to the group they were listed under
fn assign_group(mut record: RawRecord, group: &str) -> RawRecord {
    if record.group.is_empty() {
        record.group = group.to_string();
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_from_directory() {
        let response: DirectoryResponse = serde_json::from_value(json!({
            "features": {
                "filter": [
                    {"values": [{"value": "Germany"}, {"value": ""}, {"value": "Albania"}, {}]},
                    {"values": [{"value": "ignored"}]}
                ]
            }
        }))
        .unwrap();

        assert_eq!(groups_from_directory(response), vec!["Germany", "Albania"]);
        assert!(groups_from_directory(DirectoryResponse::default()).is_empty());
    }

    #[test]
    fn test_catalog_page_cursor_end_markers() {
        let page = |cursor: Value| CatalogPage {
            items: Vec::new(),
            next_cursor: Some(cursor),
        };

        assert_eq!(page(json!(100)).next(), Some(&json!(100)));
        assert_eq!(page(json!("abc")).next(), Some(&json!("abc")));
        assert!(page(Value::Null).next().is_none());
        assert!(page(json!(0)).next().is_none());
        assert!(page(json!("")).next().is_none());
        assert!(page(json!(false)).next().is_none());
        assert!(CatalogPage::default().next().is_none());
    }

    #[test]
    fn test_catalog_page_decodes_items() {
        let page: CatalogPage = serde_json::from_value(json!({
            "items": [
                {"name": "ARD", "url": "http://b/ard", "logo": "http://l/ard.png", "type": "iptv"},
                {"name": "ZDF", "group": "Germany", "url": "http://b/zdf"}
            ],
            "nextCursor": 20
        }))
        .unwrap();

        let records: Vec<RawRecord> = page
            .items
            .into_iter()
            .map(|r| assign_group(r, "Germany"))
            .collect();
        assert!(records.iter().all(|r| r.group == "Germany"));
        assert_eq!(records[0].logo(), Some("http://l/ard.png"));
    }

    #[test]
    fn test_assign_group_keeps_own_group() {
        let record = RawRecord::new("ORF1", "Austria", "http://b/orf1");
        assert_eq!(assign_group(record, "Germany").group, "Austria");
    }
}
