//! Display-name normalization for raw feed channel names
//!
//! Feed names carry quality markers, region suffixes, backup annotations and
//! bracket/pipe tails (`"SKY SPORT 1 HD | DE"`). The normalizer strips them
//! with an ordered table of removal rules so the playlist shows `"SKY SPORT 1"`.
//!
//! Rules run in table order over the same, progressively shrinking string.
//! The whole table is re-applied until the name stops changing, which makes
//! `normalize` idempotent even when one removal exposes another token.

use regex::Regex;

use crate::config::{Config, NameNormalizerConfig, NormalizationRuleConfig};
use crate::errors::{AppError, AppResult};

/// A compiled removal rule
#[derive(Debug, Clone)]
pub struct NormalizationRule {
    pub name: String,
    pub pattern: String,
    pub replacement: String,
    regex: Regex,
}

/// Applies the ordered rule table to channel names
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    rules: Vec<NormalizationRule>,
}

/// Built-in rule table, tuned to the naming conventions of the two feeds
///
/// Tokens are anchored by a leading space and a trailing word boundary so
/// `" AT"` never bites into `"ATV"` or `" ATHLETICS"`.
pub fn default_rules() -> Vec<NormalizationRuleConfig> {
    let rule = |name: &str, pattern: &str| NormalizationRuleConfig {
        name: name.to_string(),
        pattern: pattern.to_string(),
        replacement: String::new(),
    };

    vec![
        rule(
            "quality_region_token",
            r" (?:AUSTRIA|AT|HEVC|RAW|SD|HD|FHD|UHD|H265|GERMANY|DEUTSCHLAND|1080|DE|S-ANHALT|SACHSEN|MATCH TIME)\b",
        ),
        rule("plus_marker", r"\+"),
        rule("backup_annotation_spaced", r" \(BACKUP\)"),
        rule("backup_annotation", r"\(BACKUP\)"),
        rule("parenthesized_annotation", r" \([\w ]+\)"),
        rule("numbered_duplicate", r"\([\d+]\)"),
        rule(
            "trailing_suffix",
            r" (?:4K\b|\.b\b|\.c\b|\.s\b|\[.*\]|\|.*)",
        ),
    ]
}

impl NormalizationRule {
    pub fn compile(config: &NormalizationRuleConfig) -> AppResult<Self> {
        let regex = Regex::new(&config.pattern).map_err(|e| {
            AppError::configuration(format!(
                "invalid normalization rule '{}': {}",
                config.name, e
            ))
        })?;
        Ok(Self {
            name: config.name.clone(),
            pattern: config.pattern.clone(),
            replacement: config.replacement.clone(),
            regex,
        })
    }

    /// Apply this rule alone to `name`
    pub fn apply(&self, name: &str) -> String {
        self.regex
            .replace_all(name, self.replacement.as_str())
            .into_owned()
    }
}

impl NameNormalizer {
    pub fn new(rules: &[NormalizationRuleConfig]) -> AppResult<Self> {
        let rules = rules
            .iter()
            .map(NormalizationRule::compile)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn with_default_rules() -> AppResult<Self> {
        Self::new(&default_rules())
    }

    pub fn from_config(config: &NameNormalizerConfig) -> AppResult<Self> {
        Self::new(&config.rules)
    }

    /// Use the configured table if present, the built-in one otherwise
    pub fn from_app_config(config: &Config) -> AppResult<Self> {
        match &config.name_normalizer {
            Some(normalizer_config) => Self::from_config(normalizer_config),
            None => Self::with_default_rules(),
        }
    }

    pub fn rules(&self) -> &[NormalizationRule] {
        &self.rules
    }

    /// Run every rule once, in order, then trim
    pub fn apply_once(&self, name: &str) -> String {
        let mut result = name.to_string();
        for rule in &self.rules {
            result = rule.apply(&result);
        }
        result.trim().to_string()
    }

    /// Produce the human-facing display name for a raw feed name
    pub fn normalize(&self, raw_name: &str) -> String {
        let mut current = raw_name.trim().to_string();
        // Removal-only tables shrink the name on every productive pass; the
        // bound only matters for custom rules with non-empty replacements.
        for _ in 0..=raw_name.len() {
            let next = self.apply_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}
