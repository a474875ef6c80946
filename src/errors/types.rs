//! Error type definitions for the channel harvester
//!
//! Data-quality problems in the upstream feeds are never errors here: they
//! degrade to empty feeds or defaulted fields. Only failures on the explicit
//! boundaries (feed providers, persisted files, configuration) are modelled.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Feed provider errors
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Reading or writing persisted output failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

}

/// Errors raised by feed providers
///
/// The pipeline never aborts on these; they are downgraded to an empty feed
/// and recorded in the run outcome.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Provider could not be reached or returned nothing usable
    #[error("Feed unavailable: {feed} - {message}")]
    Unavailable { feed: String, message: String },

    /// Non-success HTTP status from a provider endpoint
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {feed} - {message}")]
    Parse { feed: String, message: String },

    /// Signature service did not hand out a signature
    #[error("No signature obtained from {service}")]
    MissingSignature { service: String },
}

/// Errors on the persisted catalog, diff report and history files
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// File exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content could not be encoded or decoded
    #[error("Serialization failed for {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl FeedError {
    /// Create an unavailable-feed error
    pub fn unavailable<F: Into<String>, M: Into<String>>(feed: F, message: M) -> Self {
        Self::Unavailable {
            feed: feed.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error<F: Into<String>, M: Into<String>>(feed: F, message: M) -> Self {
        Self::Parse {
            feed: feed.into(),
            message: message.into(),
        }
    }

    /// Create a missing signature error
    pub fn missing_signature<S: Into<String>>(service: S) -> Self {
        Self::MissingSignature {
            service: service.into(),
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        let feed = err
            .url()
            .map(|u| u.host_str().unwrap_or_default().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        if err.is_decode() {
            Self::parse_error(feed, err.to_string())
        } else {
            Self::unavailable(feed, err.to_string())
        }
    }
}

impl PersistenceError {
    /// Create a read error for a path
    pub fn read<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a write error for a path
    pub fn write<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error for a path
    pub fn serialization<P: Into<PathBuf>>(path: P, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_names_path() {
        let err = PersistenceError::write(
            "/tmp/out/channels.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("/tmp/out/channels.json"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn test_configuration_error_message() {
        let err = AppError::configuration("invalid normalization rule 'x'");
        assert_eq!(
            err.to_string(),
            "Configuration error: invalid normalization rule 'x'"
        );
    }

    #[test]
    fn test_feed_error_converts_into_app_error() {
        let err: AppError = FeedError::unavailable("index", "timeout").into();
        assert!(matches!(err, AppError::Feed(FeedError::Unavailable { .. })));
        assert_eq!(err.to_string(), "Feed error: Feed unavailable: index - timeout");
    }
}
