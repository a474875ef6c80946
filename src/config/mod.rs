use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    /// Overrides the built-in name normalization rules when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_normalizer: Option<NameNormalizerConfig>,
    /// Overrides the built-in subgroup categorization when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categorizer: Option<CategorizerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving playlists, the catalog, the diff report and the history
    pub dir: PathBuf,
    pub playlist_extension: String,
    pub catalog_file: String,
    pub diff_report_file: String,
    pub history_file: String,
    /// Written into the `# Source:` playlist comment
    pub source_label: String,
    /// User agent players should send when opening a stream
    pub player_user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub index_url: String,
    pub catalog_url: String,
    pub signature_url: String,
    pub groups_url: String,
    pub browser_user_agent: String,
    pub signature_user_agent: String,
    pub catalog_user_agent: String,
    pub groups_user_agent: String,
    pub catalog_language: String,
    pub catalog_region: String,
    pub catalog_client_version: String,
    pub index_timeout_secs: u64,
    pub aux_timeout_secs: u64,
    pub max_pages_per_group: usize,
    /// Groups queried when the directory endpoint is unreachable
    pub fallback_groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Group assigned to records that carry none
    pub default_group: String,
    /// Catalog-feed records matching any of these are dropped during merge
    pub exclusions: Vec<ExclusionConfig>,
}

/// Drop records of `group` whose raw name contains `name_token`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionConfig {
    pub group: String,
    pub name_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum itemized changes kept in a diff report
    pub max_changes: usize,
    /// Maximum entries kept in the history log
    pub history_limit: usize,
    /// Itemized changes echoed to the log after a run
    pub report_preview: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameNormalizerConfig {
    pub rules: Vec<NormalizationRuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationRuleConfig {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizerConfig {
    /// The only group that is split into subgroups
    pub subgroup_country: String,
    /// Evaluated in order, first match wins
    pub rules: Vec<CategoryRuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRuleConfig {
    pub category: String,
    pub keywords: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            playlist_extension: DEFAULT_PLAYLIST_EXTENSION.to_string(),
            catalog_file: DEFAULT_CATALOG_FILE.to_string(),
            diff_report_file: DEFAULT_DIFF_REPORT_FILE.to_string(),
            history_file: DEFAULT_HISTORY_FILE.to_string(),
            source_label: DEFAULT_SOURCE_LABEL.to_string(),
            player_user_agent: DEFAULT_PLAYER_USER_AGENT.to_string(),
        }
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            signature_url: DEFAULT_SIGNATURE_URL.to_string(),
            groups_url: DEFAULT_GROUPS_URL.to_string(),
            browser_user_agent: DEFAULT_BROWSER_USER_AGENT.to_string(),
            signature_user_agent: DEFAULT_SIGNATURE_USER_AGENT.to_string(),
            catalog_user_agent: DEFAULT_CATALOG_USER_AGENT.to_string(),
            groups_user_agent: DEFAULT_GROUPS_USER_AGENT.to_string(),
            catalog_language: DEFAULT_CATALOG_LANGUAGE.to_string(),
            catalog_region: DEFAULT_CATALOG_REGION.to_string(),
            catalog_client_version: DEFAULT_CATALOG_CLIENT_VERSION.to_string(),
            index_timeout_secs: DEFAULT_INDEX_TIMEOUT_SECS,
            aux_timeout_secs: DEFAULT_AUX_TIMEOUT_SECS,
            max_pages_per_group: DEFAULT_MAX_PAGES_PER_GROUP,
            fallback_groups: default_fallback_groups(),
        }
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            default_group: DEFAULT_GROUP.to_string(),
            exclusions: vec![ExclusionConfig {
                group: DEFAULT_COLLISION_GROUP.to_string(),
                name_token: DEFAULT_COLLISION_TOKEN.to_string(),
            }],
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_changes: DEFAULT_MAX_CHANGES,
            history_limit: DEFAULT_HISTORY_LIMIT,
            report_preview: DEFAULT_REPORT_PREVIEW,
        }
    }
}

impl OutputConfig {
    pub fn catalog_path(&self) -> PathBuf {
        self.dir.join(&self.catalog_file)
    }

    pub fn diff_report_path(&self) -> PathBuf {
        self.dir.join(&self.diff_report_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(&self.history_file)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> Result<Self> {
        let config_file = config_file.as_ref();
        if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
            Ok(default_config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config::load_from_file(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.tracker.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.output.dir, PathBuf::from(DEFAULT_OUTPUT_DIR));

        // Round-trips through the file it just wrote
        let reloaded = Config::load_from_file(&path).unwrap();
        assert_eq!(reloaded.feeds.fallback_groups, default_fallback_groups());
        assert_eq!(reloaded.reconciler.exclusions, config.reconciler.exclusions);
    }

    #[test]
    fn test_partial_file_keeps_remaining_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[output]
dir = "/srv/playlists"

[tracker]
max_changes = 10

[categorizer]
subgroup_country = "Austria"

[[categorizer.rules]]
category = "Sport"
keywords = ["SPORT"]
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("/srv/playlists"));
        assert_eq!(config.output.playlist_extension, DEFAULT_PLAYLIST_EXTENSION);
        assert_eq!(config.tracker.max_changes, 10);
        assert_eq!(config.tracker.history_limit, DEFAULT_HISTORY_LIMIT);
        assert!(config.name_normalizer.is_none());

        let categorizer = config.categorizer.unwrap();
        assert_eq!(categorizer.subgroup_country, "Austria");
        assert_eq!(categorizer.rules[0].keywords, vec!["SPORT".to_string()]);
        assert_eq!(
            config.output.catalog_path(),
            PathBuf::from("/srv/playlists").join(DEFAULT_CATALOG_FILE)
        );
    }
}
