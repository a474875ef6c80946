use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::FeedProvider;
use crate::config::FeedsConfig;
use crate::errors::{FeedError, FeedResult};
use crate::models::RawRecord;

/// Primary feed: one JSON array listing every live channel with its group
pub struct IndexFeedProvider {
    config: FeedsConfig,
    client: Client,
}

impl IndexFeedProvider {
    pub fn new(config: FeedsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.index_timeout_secs))
            .user_agent(config.browser_user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }
}

#[async_trait]
impl FeedProvider for IndexFeedProvider {
    fn name(&self) -> &str {
        "index"
    }

    async fn fetch(&self) -> FeedResult<Vec<RawRecord>> {
        info!("Fetching live channels from {}", self.config.index_url);

        let response = self
            .client
            .get(&self.config.index_url)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        debug!("Index feed returned {} bytes", body.len());

        parse_index_body(&body)
    }
}

/// Decode the index feed body, a JSON array of loosely typed records
pub fn parse_index_body(body: &str) -> FeedResult<Vec<RawRecord>> {
    serde_json::from_str::<Vec<RawRecord>>(body)
        .map_err(|e| FeedError::parse_error("index", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_body() {
        let body = r#"[
            {"name": "ARD HD", "group": "Germany", "url": "http://a/1", "logo": "http://l/ard.png", "id": 17},
            {"name": "ORF1", "group": "Austria", "url": "http://a/2"},
            {"group": "Germany", "url": "http://a/3"}
        ]"#;

        let records = parse_index_body(body).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].logo(), Some("http://l/ard.png"));
        assert_eq!(records[1].logo(), None);
        assert_eq!(records[2].name, "");
    }

    #[test]
    fn test_parse_index_body_rejects_non_array() {
        let err = parse_index_body(r#"{"error": "maintenance"}"#).unwrap_err();
        assert!(matches!(err, FeedError::Parse { .. }));
    }
}
