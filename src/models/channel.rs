use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// One record as handed out by a feed provider
///
/// Feeds are loosely typed: every field may be missing, null or a number.
/// Anything that is not a usable string decodes to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub group: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub logo: String,
}

impl RawRecord {
    pub fn new<N, G, U>(name: N, group: G, url: U) -> Self
    where
        N: Into<String>,
        G: Into<String>,
        U: Into<String>,
    {
        Self {
            name: name.into(),
            group: group.into(),
            url: url.into(),
            logo: String::new(),
        }
    }

    pub fn with_logo<L: Into<String>>(mut self, logo: L) -> Self {
        self.logo = logo.into();
        self
    }

    /// Logo as an option, empty meaning absent
    pub fn logo(&self) -> Option<&str> {
        Some(self.logo.as_str()).filter(|l| !l.is_empty())
    }
}

/// A logical TV channel after reconciliation
///
/// Serialized with the field names of the persisted catalog file
/// (`name`, `url`, `hls`), which previous runs are read back from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Name as received from a feed, the identity key inside a group
    #[serde(rename = "name", default)]
    pub raw_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub group: String,
    #[serde(
        default,
        serialize_with = "serialize_optional_as_empty",
        deserialize_with = "deserialize_empty_as_none"
    )]
    pub logo: Option<String>,
    /// Stream URL from the index feed
    #[serde(rename = "url", default)]
    pub primary_url: String,
    /// Stream URL from the catalog feed
    #[serde(rename = "hls", default)]
    pub secondary_url: String,
}

impl Channel {
    /// URL used for change detection: primary if present, else secondary
    pub fn effective_url(&self) -> &str {
        if self.primary_url.is_empty() {
            &self.secondary_url
        } else {
            &self.primary_url
        }
    }

    pub fn has_stream(&self) -> bool {
        !self.primary_url.is_empty() || !self.secondary_url.is_empty()
    }
}

/// Channels bucketed by group name
///
/// Groups iterate in name order. Within a group, channels are unique by
/// `raw_name` when built by the reconciler; their order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    groups: BTreeMap<String, Vec<Channel>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_groups(groups: BTreeMap<String, Vec<Channel>>) -> Self {
        Self { groups }
    }

    /// Build a catalog by bucketing channels on their own `group` field
    pub fn from_channels<I: IntoIterator<Item = Channel>>(channels: I) -> Self {
        let mut groups: BTreeMap<String, Vec<Channel>> = BTreeMap::new();
        for channel in channels {
            groups.entry(channel.group.clone()).or_default().push(channel);
        }
        Self { groups }
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<Channel>> {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&[Channel]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn total_channels(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn total_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn serialize_optional_as_empty<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or_default())
}

fn deserialize_empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
