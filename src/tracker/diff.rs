use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::config::defaults::DEFAULT_MAX_CHANGES;
use crate::config::TrackerConfig;
use crate::models::{Catalog, Channel};

/// Kind of a single channel change
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

/// One itemized entry of the diff report
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelChange {
    Added {
        group: String,
        channel: String,
    },
    Removed {
        group: String,
        channel: String,
    },
    Modified {
        group: String,
        channel: String,
        old_url: String,
        new_url: String,
    },
}

impl ChannelChange {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChannelChange::Added { .. } => ChangeKind::Added,
            ChannelChange::Removed { .. } => ChangeKind::Removed,
            ChannelChange::Modified { .. } => ChangeKind::Modified,
        }
    }

    pub fn group(&self) -> &str {
        match self {
            ChannelChange::Added { group, .. }
            | ChannelChange::Removed { group, .. }
            | ChannelChange::Modified { group, .. } => group,
        }
    }

    pub fn channel(&self) -> &str {
        match self {
            ChannelChange::Added { channel, .. }
            | ChannelChange::Removed { channel, .. }
            | ChannelChange::Modified { channel, .. } => channel,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DiffDetails {
    #[serde(default)]
    pub added_groups: Vec<String>,
    #[serde(default)]
    pub removed_groups: Vec<String>,
    /// Itemized changes, capped; the counters of [`DiffResult`] are not
    #[serde(default)]
    pub changes: Vec<ChannelChange>,
}

/// Structural difference between two catalog snapshots
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    /// Channels in the current catalog
    pub total: usize,
    #[serde(default)]
    pub details: DiffDetails,
}

impl DiffResult {
    /// Whether any channel was added, removed or modified; group changes alone do not count
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.removed > 0 || self.modified > 0
    }
}

/// Diff Engine
#[derive(Clone, Debug)]
pub struct DiffEngine {
    max_changes: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHANGES)
    }
}

impl DiffEngine {
    pub fn new(max_changes: usize) -> Self {
        Self { max_changes }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.max_changes)
    }

    pub fn max_changes(&self) -> usize {
        self.max_changes
    }

    /// Compare the current catalog against the previous one
    ///
    /// Without a previous catalog every channel counts as added and every group
    /// as a new group. Channel level changes are only computed for groups present
    /// on both sides. Changes are itemized in group, then channel name order.
    pub fn diff(&self, previous: Option<&Catalog>, current: &Catalog) -> DiffResult {
        let total = current.total_channels();

        let Some(previous) = previous else {
            return DiffResult {
                added: total,
                total,
                details: DiffDetails {
                    added_groups: current.group_names().map(str::to_string).collect(),
                    ..DiffDetails::default()
                },
                ..DiffResult::default()
            };
        };

        let mut result = DiffResult {
            total,
            ..DiffResult::default()
        };

        result.details.added_groups = current
            .group_names()
            .filter(|g| !previous.contains_group(g))
            .map(str::to_string)
            .collect();
        result.details.removed_groups = previous
            .group_names()
            .filter(|g| !current.contains_group(g))
            .map(str::to_string)
            .collect();

        for (group, current_channels) in current.groups() {
            let Some(previous_channels) = previous.group(group) else {
                continue;
            };
            self.diff_group(group, previous_channels, current_channels, &mut result);
        }

        debug!(
            "Diff: +{} -{} ~{} over {} channels, {} itemized",
            result.added,
            result.removed,
            result.modified,
            result.total,
            result.details.changes.len()
        );

        result
    }

    fn diff_group(
        &self,
        group: &str,
        previous: &[Channel],
        current: &[Channel],
        result: &mut DiffResult,
    ) {
        let previous_index = index_by_name(previous);
        let current_index = index_by_name(current);

        let names: BTreeSet<&str> = previous_index
            .keys()
            .chain(current_index.keys())
            .copied()
            .collect();

        for name in names {
            let change = match (previous_index.get(name), current_index.get(name)) {
                (None, Some(_)) => {
                    result.added += 1;
                    ChannelChange::Added {
                        group: group.to_string(),
                        channel: name.to_string(),
                    }
                }
                (Some(_), None) => {
                    result.removed += 1;
                    ChannelChange::Removed {
                        group: group.to_string(),
                        channel: name.to_string(),
                    }
                }
                (Some(old), Some(new)) if old.effective_url() != new.effective_url() => {
                    result.modified += 1;
                    ChannelChange::Modified {
                        group: group.to_string(),
                        channel: name.to_string(),
                        old_url: old.effective_url().to_string(),
                        new_url: new.effective_url().to_string(),
                    }
                }
                _ => continue,
            };

            if result.details.changes.len() < self.max_changes {
                result.details.changes.push(change);
            }
        }
    }
}

/// Name index of a group; the last channel wins when a name repeats
fn index_by_name(channels: &[Channel]) -> BTreeMap<&str, &Channel> {
    channels
        .iter()
        .map(|channel| (channel.raw_name.as_str(), channel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn channel(group: &str, name: &str, url: &str) -> Channel {
        Channel {
            raw_name: name.to_string(),
            display_name: name.to_string(),
            group: group.to_string(),
            logo: None,
            primary_url: url.to_string(),
            secondary_url: String::new(),
        }
    }

    fn catalog(channels: &[(&str, &str, &str)]) -> Catalog {
        Catalog::from_channels(
            channels
                .iter()
                .map(|(group, name, url)| channel(group, name, url)),
        )
    }

    #[test]
    fn test_added_channel() {
        let previous = catalog(&[("Germany", "ARD", "u1")]);
        let current = catalog(&[("Germany", "ARD", "u1"), ("Germany", "ZDF", "u2")]);

        let diff = DiffEngine::default().diff(Some(&previous), &current);

        assert_eq!((diff.added, diff.removed, diff.modified), (1, 0, 0));
        assert_eq!(diff.total, 2);
        assert_eq!(
            serde_json::to_value(&diff.details.changes).unwrap(),
            json!([{"type": "added", "group": "Germany", "channel": "ZDF"}])
        );
    }

    #[test]
    fn test_url_change_is_modified() {
        let previous = catalog(&[("Germany", "ARD", "a")]);
        let current = catalog(&[("Germany", "ARD", "b")]);

        let diff = DiffEngine::default().diff(Some(&previous), &current);

        assert_eq!((diff.added, diff.removed, diff.modified), (0, 0, 1));
        assert_eq!(
            diff.details.changes,
            vec![ChannelChange::Modified {
                group: "Germany".to_string(),
                channel: "ARD".to_string(),
                old_url: "a".to_string(),
                new_url: "b".to_string(),
            }]
        );
    }

    #[test]
    fn test_effective_url_falls_back_to_secondary() {
        let previous = catalog(&[("Germany", "ARD", "")]);
        let mut ard = channel("Germany", "ARD", "");
        ard.secondary_url = "http://b/ard".to_string();
        let current = Catalog::from_channels(vec![ard]);

        let diff = DiffEngine::default().diff(Some(&previous), &current);
        assert_eq!(diff.modified, 1);

        let unchanged = DiffEngine::default().diff(Some(&current), &current);
        assert!(!unchanged.has_changes());
    }

    #[test]
    fn test_first_run() {
        let current = catalog(&[
            ("Germany", "ARD", "u1"),
            ("Germany", "ZDF", "u2"),
            ("Germany", "RTL", "u3"),
            ("Austria", "ORF1", "u4"),
            ("Austria", "ORF2", "u5"),
        ]);

        let diff = DiffEngine::default().diff(None, &current);

        assert_eq!(diff.added, 5);
        assert_eq!(diff.removed, 0);
        assert_eq!(diff.modified, 0);
        assert_eq!(diff.total, 5);
        assert_eq!(diff.details.added_groups, vec!["Austria", "Germany"]);
        assert!(diff.details.changes.is_empty());
        assert!(diff.has_changes());
    }

    #[test]
    fn test_group_changes_do_not_count_channels() {
        let previous = catalog(&[("Germany", "ARD", "u1"), ("Albania", "RTSH", "u9")]);
        let current = catalog(&[("Germany", "ARD", "u1"), ("Austria", "ORF1", "u4")]);

        let diff = DiffEngine::default().diff(Some(&previous), &current);

        assert_eq!(diff.details.added_groups, vec!["Austria"]);
        assert_eq!(diff.details.removed_groups, vec!["Albania"]);
        assert_eq!((diff.added, diff.removed, diff.modified), (0, 0, 0));
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_repeated_name_compares_last_entry() {
        let previous = catalog(&[("Germany", "ARD", "old"), ("Germany", "ARD", "new")]);
        let current = catalog(&[("Germany", "ARD", "new")]);

        let diff = DiffEngine::default().diff(Some(&previous), &current);
        assert_eq!((diff.added, diff.removed, diff.modified), (0, 0, 0));
        assert!(diff.details.changes.is_empty());

        let reversed = DiffEngine::default().diff(Some(&current), &previous);
        assert_eq!(reversed.modified, 0);
    }

    #[test]
    fn test_changes_are_capped_but_counts_are_not() {
        let previous = catalog(&[("Germany", "KEEP", "u")]);
        let names: Vec<String> = (0..75).map(|i| format!("CH{:03}", i)).collect();
        let mut channels: Vec<(&str, &str, &str)> = names
            .iter()
            .map(|n| ("Germany", n.as_str(), "u"))
            .collect();
        channels.push(("Germany", "KEEP", "u"));
        let current = catalog(&channels);

        let diff = DiffEngine::default().diff(Some(&previous), &current);

        assert_eq!(diff.added, 75);
        assert_eq!(diff.details.changes.len(), 50);
        assert_eq!(diff.details.changes[0].channel(), "CH000");
        assert_eq!(diff.details.changes[49].channel(), "CH049");
    }

    #[test]
    fn test_change_order_is_group_then_name() {
        let previous = catalog(&[
            ("Germany", "ZDF", "u"),
            ("Germany", "ARD", "old"),
            ("Austria", "ORF1", "u"),
        ]);
        let current = catalog(&[
            ("Germany", "ARD", "new"),
            ("Germany", "BR", "u"),
            ("Austria", "ORF2", "u"),
        ]);

        let diff = DiffEngine::default().diff(Some(&previous), &current);
        let order: Vec<(&str, &str, ChangeKind)> = diff
            .details
            .changes
            .iter()
            .map(|c| (c.group(), c.channel(), c.kind()))
            .collect();

        assert_eq!(
            order,
            vec![
                ("Austria", "ORF1", ChangeKind::Removed),
                ("Austria", "ORF2", ChangeKind::Added),
                ("Germany", "ARD", ChangeKind::Modified),
                ("Germany", "BR", ChangeKind::Added),
                ("Germany", "ZDF", ChangeKind::Removed),
            ]
        );
    }

    #[test]
    fn test_diff_is_deterministic() {
        let previous = catalog(&[("Germany", "B", "1"), ("Germany", "A", "1"), ("France", "TF1", "x")]);
        let current = catalog(&[("Germany", "C", "1"), ("Germany", "A", "2"), ("France", "M6", "y")]);

        let engine = DiffEngine::new(3);
        let first = serde_json::to_string(&engine.diff(Some(&previous), &current)).unwrap();
        let second = serde_json::to_string(&engine.diff(Some(&previous), &current)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_shape() {
        let previous = catalog(&[("Germany", "ARD", "a")]);
        let current = catalog(&[("Germany", "ARD", "b")]);
        let diff = DiffEngine::default().diff(Some(&previous), &current);

        assert_eq!(
            serde_json::to_value(&diff).unwrap(),
            json!({
                "added": 0,
                "removed": 0,
                "modified": 1,
                "total": 1,
                "details": {
                    "added_groups": [],
                    "removed_groups": [],
                    "changes": [{
                        "type": "modified",
                        "group": "Germany",
                        "channel": "ARD",
                        "old_url": "a",
                        "new_url": "b"
                    }]
                }
            })
        );
    }
}
