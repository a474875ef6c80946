/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.

// Output defaults
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_PLAYLIST_EXTENSION: &str = "m3u8";
pub const DEFAULT_CATALOG_FILE: &str = "channels.json";
pub const DEFAULT_DIFF_REPORT_FILE: &str = "diff_report.json";
pub const DEFAULT_HISTORY_FILE: &str = "history.json";
pub const DEFAULT_SOURCE_LABEL: &str = "vavoo.to";
pub const DEFAULT_PLAYER_USER_AGENT: &str = "VAVOO/2.6";

// Feed provider defaults
pub const DEFAULT_INDEX_URL: &str = "https://www.vavoo.to/live2/index?output=json";
pub const DEFAULT_CATALOG_URL: &str = "https://vavoo.to/mediahubmx-catalog.json";
pub const DEFAULT_SIGNATURE_URL: &str = "https://www.lokke.app/api/app/ping";
pub const DEFAULT_GROUPS_URL: &str = "https://www.oha.to/oha-tv-index/directory.watched";
pub const DEFAULT_BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_SIGNATURE_USER_AGENT: &str = "okhttp/4.11.0";
pub const DEFAULT_CATALOG_USER_AGENT: &str = "MediaHubMX/2";
pub const DEFAULT_GROUPS_USER_AGENT: &str = "WATCHED/1.8.3 (android)";
pub const DEFAULT_CATALOG_LANGUAGE: &str = "de";
pub const DEFAULT_CATALOG_REGION: &str = "AT";
pub const DEFAULT_CATALOG_CLIENT_VERSION: &str = "3.0.2";
pub const DEFAULT_INDEX_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_AUX_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_PAGES_PER_GROUP: usize = 200;

// Reconciler defaults
pub const DEFAULT_GROUP: &str = "Unknown";
pub const DEFAULT_COLLISION_GROUP: &str = "Germany";
pub const DEFAULT_COLLISION_TOKEN: &str = "LUXEMBOURG";

// Categorizer defaults
pub const DEFAULT_SUBGROUP_COUNTRY: &str = "Germany";

// Tracker defaults
pub const DEFAULT_MAX_CHANGES: usize = 50;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;
pub const DEFAULT_REPORT_PREVIEW: usize = 10;

/// Groups used when the directory endpoint cannot be queried
pub fn default_fallback_groups() -> Vec<String> {
    [
        "Germany",
        "Austria",
        "Switzerland",
        "Turkey",
        "United Kingdom",
        "USA",
        "Spain",
        "Italy",
        "France",
        "Poland",
        "Russia",
    ]
    .iter()
    .map(|g| g.to_string())
    .collect()
}
