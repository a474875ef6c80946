use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::FeedsConfig;
use crate::errors::FeedResult;
use crate::models::RawRecord;

pub mod ingest_catalog;
pub mod ingest_index;

pub use ingest_catalog::CatalogFeedProvider;
pub use ingest_index::IndexFeedProvider;

/// A source of raw channel records
#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Short name used in logs and run outcomes
    fn name(&self) -> &str;

    async fn fetch(&self) -> FeedResult<Vec<RawRecord>>;
}

/// Provider serving a fixed set of records, for offline runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticFeedProvider {
    name: String,
    records: Vec<RawRecord>,
}

impl StaticFeedProvider {
    pub fn new<S: Into<String>>(name: S, records: Vec<RawRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

#[async_trait]
impl FeedProvider for StaticFeedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> FeedResult<Vec<RawRecord>> {
        Ok(self.records.clone())
    }
}

/// What a single provider call produced
#[derive(Debug, Clone, PartialEq)]
pub struct FeedOutcome {
    pub feed: String,
    pub records: usize,
    /// Set when the provider failed and the feed was replaced by an empty one
    pub error: Option<String>,
}

impl FeedOutcome {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Both feeds of one run, ready for reconciliation
#[derive(Debug, Clone, Default)]
pub struct FetchedFeeds {
    pub index: Vec<RawRecord>,
    pub catalog: Vec<RawRecord>,
    pub outcomes: Vec<FeedOutcome>,
}

impl FetchedFeeds {
    pub fn is_degraded(&self) -> bool {
        self.outcomes.iter().any(FeedOutcome::is_degraded)
    }
}

/// Fetch a feed, downgrading any provider failure to an empty feed
pub async fn fetch_or_empty(provider: &dyn FeedProvider) -> (Vec<RawRecord>, FeedOutcome) {
    match provider.fetch().await {
        Ok(records) => {
            info!("Found {} records in {} feed", records.len(), provider.name());
            let outcome = FeedOutcome {
                feed: provider.name().to_string(),
                records: records.len(),
                error: None,
            };
            (records, outcome)
        }
        Err(e) => {
            warn!(
                "{} feed unavailable, continuing with an empty feed: {}",
                provider.name(),
                e
            );
            let outcome = FeedOutcome {
                feed: provider.name().to_string(),
                records: 0,
                error: Some(e.to_string()),
            };
            (Vec::new(), outcome)
        }
    }
}

/// Runs the index and catalog providers one after the other
pub struct IngestorService {
    index: Box<dyn FeedProvider>,
    catalog: Box<dyn FeedProvider>,
}

impl IngestorService {
    pub fn new(index: Box<dyn FeedProvider>, catalog: Box<dyn FeedProvider>) -> Self {
        Self { index, catalog }
    }

    /// Service backed by the remote HTTP providers
    pub fn from_config(config: &FeedsConfig) -> Self {
        Self::new(
            Box::new(IndexFeedProvider::new(config.clone())),
            Box::new(CatalogFeedProvider::new(config.clone())),
        )
    }

    pub async fn fetch_all(&self) -> FetchedFeeds {
        let (index, index_outcome) = fetch_or_empty(self.index.as_ref()).await;
        let (catalog, catalog_outcome) = fetch_or_empty(self.catalog.as_ref()).await;

        FetchedFeeds {
            index,
            catalog,
            outcomes: vec![index_outcome, catalog_outcome],
        }
    }
}
