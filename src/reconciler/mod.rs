//! Merging of the index and catalog feeds into one per-group catalog
//!
//! Index-feed records seed the catalog with their primary URL. Catalog-feed
//! records are matched by group and exact raw name: a match gains the
//! secondary URL (and a logo if it had none), anything else becomes a new
//! catalog-only channel.
//!
//! Records with a missing name are kept under an empty raw name rather than
//! rejected; missing groups fall back to the configured default group.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::config::defaults::DEFAULT_GROUP;
use crate::config::{Config, ExclusionConfig};
use crate::errors::AppResult;
use crate::models::{Catalog, Channel, RawRecord};
use crate::utils::NameNormalizer;

/// Decides whether a catalog-feed record is dropped during the merge
///
/// `group` is the group the record would be filed under, after trimming and
/// the default-group fallback.
pub trait ExclusionPredicate: Send + Sync {
    fn excludes(&self, record: &RawRecord, group: &str) -> bool;
}

impl<F> ExclusionPredicate for F
where
    F: Fn(&RawRecord, &str) -> bool + Send + Sync,
{
    fn excludes(&self, record: &RawRecord, group: &str) -> bool {
        self(record, group)
    }
}

/// Drops records of one group whose raw name contains a token
///
/// Used for groups whose feed listing also carries a neighbouring region's
/// channels under colliding names.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNameTokenExclusion {
    pub group: String,
    pub name_token: String,
}

impl GroupNameTokenExclusion {
    pub fn new<G: Into<String>, T: Into<String>>(group: G, name_token: T) -> Self {
        Self {
            group: group.into(),
            name_token: name_token.into(),
        }
    }
}

impl From<&ExclusionConfig> for GroupNameTokenExclusion {
    fn from(config: &ExclusionConfig) -> Self {
        Self::new(config.group.clone(), config.name_token.clone())
    }
}

impl ExclusionPredicate for GroupNameTokenExclusion {
    fn excludes(&self, record: &RawRecord, group: &str) -> bool {
        group == self.group
            && !self.name_token.is_empty()
            && record.name.contains(&self.name_token)
    }
}

/// Counters reported after a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub index_channels: usize,
    pub merged: usize,
    pub catalog_only: usize,
    pub excluded: usize,
    pub duplicates: usize,
}

pub struct FeedReconciler {
    normalizer: NameNormalizer,
    default_group: String,
    exclusions: Vec<Box<dyn ExclusionPredicate>>,
}

/// Catalog under construction, with a per-group name lookup
#[derive(Default)]
struct CatalogBuilder {
    groups: BTreeMap<String, Vec<Channel>>,
    positions: HashMap<String, HashMap<String, usize>>,
}

impl CatalogBuilder {
    fn find_mut(&mut self, group: &str, raw_name: &str) -> Option<&mut Channel> {
        let position = *self.positions.get(group)?.get(raw_name)?;
        self.groups.get_mut(group).and_then(|channels| channels.get_mut(position))
    }

    fn insert(&mut self, channel: Channel) {
        let channels = self.groups.entry(channel.group.clone()).or_default();
        self.positions
            .entry(channel.group.clone())
            .or_default()
            .insert(channel.raw_name.clone(), channels.len());
        channels.push(channel);
    }

    fn build(self) -> Catalog {
        Catalog::from_groups(self.groups)
    }
}

impl FeedReconciler {
    pub fn new(normalizer: NameNormalizer) -> Self {
        Self {
            normalizer,
            default_group: DEFAULT_GROUP.to_string(),
            exclusions: Vec::new(),
        }
    }

    pub fn with_default_group<S: Into<String>>(mut self, group: S) -> Self {
        self.default_group = group.into();
        self
    }

    pub fn with_exclusion<P: ExclusionPredicate + 'static>(mut self, predicate: P) -> Self {
        self.exclusions.push(Box::new(predicate));
        self
    }

    pub fn from_app_config(config: &Config) -> AppResult<Self> {
        let normalizer = NameNormalizer::from_app_config(config)?;
        let reconciler = config.reconciler.exclusions.iter().fold(
            Self::new(normalizer).with_default_group(config.reconciler.default_group.clone()),
            |reconciler, exclusion| {
                reconciler.with_exclusion(GroupNameTokenExclusion::from(exclusion))
            },
        );
        Ok(reconciler)
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    fn group_of(&self, record: &RawRecord) -> String {
        let group = record.group.trim();
        if group.is_empty() {
            self.default_group.clone()
        } else {
            group.to_string()
        }
    }

    fn is_excluded(&self, record: &RawRecord, group: &str) -> bool {
        self.exclusions.iter().any(|p| p.excludes(record, group))
    }

    fn new_channel(&self, record: &RawRecord, group: String) -> Channel {
        Channel {
            raw_name: record.name.clone(),
            display_name: self.normalizer.normalize(&record.name),
            group,
            logo: record.logo().map(str::to_string),
            primary_url: String::new(),
            secondary_url: String::new(),
        }
    }

    /// Merge both feeds into a fresh catalog
    pub fn reconcile(&self, index_feed: &[RawRecord], catalog_feed: &[RawRecord]) -> Catalog {
        self.reconcile_with_stats(index_feed, catalog_feed).0
    }

    pub fn reconcile_with_stats(
        &self,
        index_feed: &[RawRecord],
        catalog_feed: &[RawRecord],
    ) -> (Catalog, ReconcileStats) {
        let mut builder = CatalogBuilder::default();
        let mut stats = ReconcileStats::default();

        for record in index_feed {
            let group = self.group_of(record);
            match builder.find_mut(&group, &record.name) {
                Some(existing) => {
                    // Same name listed twice: only fill what the first one lacks
                    stats.duplicates += 1;
                    if existing.primary_url.is_empty() {
                        existing.primary_url = record.url.clone();
                    }
                    if existing.logo.is_none() {
                        existing.logo = record.logo().map(str::to_string);
                    }
                }
                None => {
                    let mut channel = self.new_channel(record, group);
                    channel.primary_url = record.url.clone();
                    builder.insert(channel);
                    stats.index_channels += 1;
                }
            }
        }

        for record in catalog_feed {
            let group = self.group_of(record);
            if self.is_excluded(record, &group) {
                debug!("Excluding catalog record {} ({})", record.name, group);
                stats.excluded += 1;
                continue;
            }

            match builder.find_mut(&group, &record.name) {
                Some(existing) => {
                    // A repeated catalog name replaces the earlier secondary URL
                    if existing.secondary_url.is_empty() {
                        stats.merged += 1;
                    } else {
                        stats.duplicates += 1;
                    }
                    existing.secondary_url = record.url.clone();
                    if existing.logo.is_none() {
                        existing.logo = record.logo().map(str::to_string);
                    }
                }
                None => {
                    let mut channel = self.new_channel(record, group);
                    channel.secondary_url = record.url.clone();
                    builder.insert(channel);
                    stats.catalog_only += 1;
                }
            }
        }

        let catalog = builder.build();
        info!(
            "Reconciled {} channels in {} groups ({} index, {} merged, {} catalog-only, {} excluded)",
            catalog.total_channels(),
            catalog.total_groups(),
            stats.index_channels,
            stats.merged,
            stats.catalog_only,
            stats.excluded
        );

        (catalog, stats)
    }
}
