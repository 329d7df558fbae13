//! Error type definitions for the M3U classifier
//!
//! The hierarchy mirrors the application layers so a failure can be traced
//! back to the collaborator (or configuration entry) that produced it.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Source fetching errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Output persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Version-control publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

/// Invalid category definitions or settings
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Two categories share a name
    #[error("Duplicate category name: {name}")]
    DuplicateCategory { name: String },

    /// A category was declared with an empty name
    #[error("Category at position {position} has an empty name")]
    EmptyCategoryName { position: usize },

    /// A rule string is empty and would match everything
    #[error("Category '{category}' has an empty {kind} rule")]
    EmptyRule { category: String, kind: String },

    /// A regex rule failed to compile
    #[error("Invalid pattern '{pattern}' in category '{category}': {source}")]
    InvalidPattern {
        category: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A similarity noise pattern failed to compile
    #[error("Invalid noise pattern '{pattern}': {source}")]
    InvalidNoisePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Similarity threshold outside 0.0..=1.0
    #[error("Similarity threshold {value} is outside the range 0.0 to 1.0")]
    InvalidThreshold { value: f64 },

    /// A setting has a value that cannot be used
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Config file is missing
    #[error("Configuration file not found: {path} (run `m3u-classifier init` to create one)")]
    NotFound { path: PathBuf },

    /// Config file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be written
    #[error("Failed to write configuration file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for our schema
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Source fetching errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Request did not complete in time
    #[error("Connection timeout after {timeout_secs}s: {url}")]
    Timeout { url: String, timeout_secs: u64 },

    /// Non-success HTTP status
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// URL could not be parsed or uses an unsupported scheme
    #[error("Invalid source URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// No source was configured
    #[error("No playlist source URL configured (set [source].url, --url or M3U_URL)")]
    MissingUrl,

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Local file source could not be read
    #[error("Failed to read playlist {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output persistence errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// The output file or its directory could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Version-control publishing errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Target directory has no `.git`
    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    /// The playlist to publish does not exist
    #[error("Cannot publish {path}: {source}")]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A git command exited unsuccessfully
    #[error("`git {command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// git could not be spawned at all
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Convenience methods for creating common error types
impl ConfigurationError {
    /// Create an invalid value error for a named setting
    pub fn invalid_value<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create an invalid URL error
    pub fn invalid_url<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_converts_to_app_error() {
        let err: AppError = ConfigurationError::DuplicateCategory {
            name: "Movies".to_string(),
        }
        .into();

        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Duplicate category name: Movies"
        );
    }

    #[test]
    fn test_http_error_display() {
        let err = SourceError::Http {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error: 404 - Not Found");
    }

    #[test]
    fn test_invalid_pattern_keeps_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ConfigurationError::InvalidPattern {
            category: "Sports".to_string(),
            pattern: "(".to_string(),
            source,
        };

        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Invalid pattern '(' in category 'Sports'"));
    }
}
