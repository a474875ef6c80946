//! Timestamp parsing and formatting for the persisted files
//!
//! Catalog and history files may have been written by older runs with naive
//! local timestamps, so reading is lenient while writing is always RFC3339.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur during datetime operations
#[derive(Error, Debug)]
pub enum DateTimeError {
    /// Invalid datetime format provided
    #[error("Invalid datetime format: '{input}' - expected RFC3339 (2023-01-01T12:00:00Z) or naive ISO (2023-01-01T12:00:00.123456)")]
    InvalidFormat { input: String },
}

pub struct DateTimeParser;

impl DateTimeParser {
    /// Parse a timestamp in any of the formats previous runs may have written
    ///
    /// Naive timestamps are taken as UTC.
    pub fn parse_flexible(datetime_str: &str) -> Result<DateTime<Utc>, DateTimeError> {
        let trimmed = datetime_str.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }

        let naive_formats = [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
        ];

        for format in &naive_formats {
            if let Ok(naive_dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
            }
        }

        Err(DateTimeError::InvalidFormat {
            input: datetime_str.to_string(),
        })
    }

    /// Format used in the `# Generated:` playlist comment
    pub fn format_for_playlist(dt: &DateTime<Utc>) -> String {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Format used in catalog and history files
    pub fn format_for_files(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339()
    }
}

pub fn serialize_datetime<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    DateTimeParser::format_for_files(dt).serialize(serializer)
}

/// Accepts any known format; unparseable or missing values become `None`
pub fn deserialize_lenient_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.and_then(|s| DateTimeParser::parse_flexible(&s).ok()))
}

pub fn serialize_optional_datetime<S>(
    dt: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serialize_datetime(dt, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = DateTimeParser::parse_flexible("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_naive_iso_with_fraction() {
        let dt = DateTimeParser::parse_flexible("2024-03-01T08:15:30.123456").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 30).unwrap() + chrono::Duration::microseconds(123456));
    }

    #[test]
    fn test_invalid_format() {
        match DateTimeParser::parse_flexible("yesterday") {
            Err(DateTimeError::InvalidFormat { input }) => assert_eq!(input, "yesterday"),
            other => panic!("Expected InvalidFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_format_for_playlist() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 8, 5, 0).unwrap();
        assert_eq!(DateTimeParser::format_for_playlist(&dt), "2024-03-01 08:05:00");
    }
}
