//! Utility modules for the channel harvester
//!
//! - `utils::name_normalizer` turns raw feed names into display names
//! - `utils::categorizer` splits the subgroup country into categories
//! - `utils::datetime` parses and formats timestamps in persisted files

pub mod categorizer;
pub mod datetime;
pub mod name_normalizer;

pub use categorizer::ChannelCategorizer;
pub use name_normalizer::NameNormalizer;

/// Turn a group name into a filesystem-safe file stem
///
/// Every character that is not a word character, `-` or `.` becomes `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("United Kingdom"), "United_Kingdom");
        assert_eq!(sanitize_file_stem("Bosnia/Herzegovina"), "Bosnia_Herzegovina");
        assert_eq!(sanitize_file_stem("Türkiye"), "Türkiye");
        assert_eq!(sanitize_file_stem("ex-YU.tv"), "ex-YU.tv");
    }
}
