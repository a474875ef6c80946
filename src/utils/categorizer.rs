//! Subgroup categorization for the one country group that is split up
//!
//! Channels of the subgroup country are sorted into premium, sports and
//! cinema buckets by keyword containment on the uppercased raw name. Every
//! other group passes through unchanged.

use crate::config::defaults::DEFAULT_SUBGROUP_COUNTRY;
use crate::config::{CategorizerConfig, CategoryRuleConfig, Config};

/// One `(keyword-set, category)` entry of the rule table
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRule {
    pub category: String,
    /// Stored uppercased
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChannelCategorizer {
    subgroup_country: String,
    rules: Vec<CategoryRule>,
}

/// Built-in table in priority order: premium bundle, sports, cinema
pub fn default_rules() -> Vec<CategoryRuleConfig> {
    let rule = |category: &str, keywords: &[&str]| CategoryRuleConfig {
        category: category.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    };

    vec![
        rule(
            "Sky",
            &["13TH", "AXN", "A&E", "INVESTIGATION", "TNT", "DISNEY", "SKY", "WARNER"],
        ),
        rule("Sport", &["BUNDESLIGA", "SPORT", "TELEKOM"]),
        rule("Cine", &["CINE", "EAGLE", "KINO", "FILMAX", "POPCORN"]),
    ]
}

impl CategoryRule {
    pub fn from_config(config: &CategoryRuleConfig) -> Self {
        Self {
            category: config.category.clone(),
            keywords: config
                .keywords
                .iter()
                .map(|k| k.trim().to_uppercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// `upper_name` must already be uppercased
    pub fn matches(&self, upper_name: &str) -> bool {
        self.keywords.iter().any(|k| upper_name.contains(k.as_str()))
    }
}

impl Default for ChannelCategorizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUBGROUP_COUNTRY, &default_rules())
    }
}

impl ChannelCategorizer {
    pub fn new<S: Into<String>>(subgroup_country: S, rules: &[CategoryRuleConfig]) -> Self {
        Self {
            subgroup_country: subgroup_country.into(),
            rules: rules.iter().map(CategoryRule::from_config).collect(),
        }
    }

    pub fn from_config(config: &CategorizerConfig) -> Self {
        Self::new(config.subgroup_country.clone(), &config.rules)
    }

    pub fn from_app_config(config: &Config) -> Self {
        config
            .categorizer
            .as_ref()
            .map(Self::from_config)
            .unwrap_or_default()
    }

    pub fn subgroup_country(&self) -> &str {
        &self.subgroup_country
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Refine `group` into a subgroup for the subgroup country; first matching rule wins
    pub fn categorize(&self, raw_name: &str, group: &str) -> String {
        if group != self.subgroup_country {
            return group.to_string();
        }

        let upper = raw_name.to_uppercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&upper))
            .map(|rule| rule.category.clone())
            .unwrap_or_else(|| group.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SKY CINEMA ACTION", "Sky")]
    #[case("sky sport 1", "Sky")]
    #[case("DISNEY CHANNEL", "Sky")]
    #[case("A&E HD", "Sky")]
    #[case("SPORT1", "Sport")]
    #[case("MAGENTA TELEKOM EVENT", "Sport")]
    #[case("KINOWELT", "Cine")]
    #[case("Filmax", "Cine")]
    #[case("ARD", "Germany")]
    fn test_germany_subgroups(#[case] name: &str, #[case] expected: &str) {
        let categorizer = ChannelCategorizer::default();
        assert_eq!(categorizer.categorize(name, "Germany"), expected);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let categorizer = ChannelCategorizer::default();
        // Matches both the premium and the sports keyword sets
        assert_eq!(categorizer.categorize("SKY SPORT 1", "Germany"), "Sky");
        // Matches sports and cinema
        assert_eq!(categorizer.categorize("SPORT KINO", "Germany"), "Sport");

        let reordered = ChannelCategorizer::new(
            "Germany",
            &[default_rules()[1].clone(), default_rules()[0].clone()],
        );
        assert_eq!(reordered.categorize("SKY SPORT 1", "Germany"), "Sport");
    }

    #[test]
    fn test_other_groups_pass_through() {
        let categorizer = ChannelCategorizer::default();
        assert_eq!(categorizer.categorize("SKY SPORT 1", "Austria"), "Austria");
        assert_eq!(categorizer.categorize("KINO", "United Kingdom"), "United Kingdom");
    }

    #[test]
    fn test_configured_subgroup_country() {
        let config = CategorizerConfig {
            subgroup_country: "Austria".to_string(),
            rules: vec![CategoryRuleConfig {
                category: "Sport".to_string(),
                keywords: vec![" sport ".to_string(), String::new()],
            }],
        };
        let categorizer = ChannelCategorizer::from_config(&config);
        assert_eq!(categorizer.rules()[0].keywords, vec!["SPORT".to_string()]);
        assert_eq!(categorizer.categorize("ORF SPORT+", "Austria"), "Sport");
        assert_eq!(categorizer.categorize("SKY SPORT 1", "Germany"), "Germany");
    }
}
